use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::delivery::Delivery;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryEventKind {
    Created,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub kind: DeliveryEventKind,
    pub delivery: Delivery,
    pub at: DateTime<Utc>,
}

impl DeliveryEvent {
    pub fn new(kind: DeliveryEventKind, delivery: Delivery) -> Self {
        Self {
            kind,
            delivery,
            at: Utc::now(),
        }
    }
}
