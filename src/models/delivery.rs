use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: DeliveryStatus,
    pub photo: Option<String>,
}

impl Delivery {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn is_completed(&self) -> bool {
        self.status == DeliveryStatus::Completed
    }
}

pub fn new_delivery_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn create_delivery(id: String, address: String, coordinate: Coordinate) -> Delivery {
    Delivery {
        id,
        address,
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        status: DeliveryStatus::Pending,
        photo: None,
    }
}

/// Marks a pending delivery as completed. Completing twice is an error,
/// not a no-op. Without a new photo the previous one is kept.
pub fn complete_delivery(delivery: &Delivery, photo: Option<String>) -> Result<Delivery, AppError> {
    if delivery.is_completed() {
        return Err(AppError::Precondition(format!(
            "delivery {} is already completed",
            delivery.id
        )));
    }

    Ok(Delivery {
        status: DeliveryStatus::Completed,
        photo: photo.or_else(|| delivery.photo.clone()),
        ..delivery.clone()
    })
}

pub fn filter_by_status(
    deliveries: &[Delivery],
    status: DeliveryStatus,
) -> impl Iterator<Item = &Delivery> + Clone {
    deliveries
        .iter()
        .filter(move |delivery| delivery.status == status)
}

pub fn seed_deliveries() -> Vec<Delivery> {
    vec![
        create_delivery(
            "1".to_string(),
            "Rua das Flores, 123 - Jardim Paulista, São Paulo - SP, 01415-000".to_string(),
            Coordinate::new(-23.5675, -46.6523),
        ),
        Delivery {
            status: DeliveryStatus::Completed,
            photo: Some("https://example.com/photo.jpg".to_string()),
            ..create_delivery(
                "2".to_string(),
                "Avenida Paulista, 1000 - Bela Vista, São Paulo - SP, 01310-000".to_string(),
                Coordinate::new(-23.5615, -46.6553),
            )
        },
    ]
}
