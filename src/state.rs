use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::collaborators::credentials::CredentialStore;
use crate::collaborators::geocoding::Geocoder;
use crate::collaborators::photos::PhotoStorage;
use crate::models::address::AddressDraft;
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::models::event::DeliveryEvent;
use crate::observability::metrics::Metrics;
use crate::store::DeliveryStore;

pub struct Collaborators {
    pub geocoder: Arc<dyn Geocoder>,
    pub photos: Arc<dyn PhotoStorage>,
    pub credentials: Arc<dyn CredentialStore>,
}

#[derive(Debug, Clone)]
pub struct StateOptions {
    pub event_buffer_size: usize,
    pub require_delivery_photo: bool,
    pub max_photo_bytes: usize,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            event_buffer_size: 1024,
            require_delivery_photo: true,
            max_photo_bytes: 10 * 1024 * 1024,
        }
    }
}

pub struct AppState {
    pub deliveries: DeliveryStore,
    pub drafts: DashMap<Uuid, AddressDraft>,
    confirmations: DashMap<String, Arc<Mutex<()>>>,
    pub geocoder: Arc<dyn Geocoder>,
    pub photos: Arc<dyn PhotoStorage>,
    pub credentials: Arc<dyn CredentialStore>,
    pub delivery_events_tx: broadcast::Sender<DeliveryEvent>,
    pub options: StateOptions,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        collaborators: Collaborators,
        initial: Vec<Delivery>,
        options: StateOptions,
    ) -> Self {
        let (delivery_events_tx, _unused_rx) = broadcast::channel(options.event_buffer_size);
        let metrics = Metrics::new();

        let pending = initial
            .iter()
            .filter(|delivery| delivery.status == DeliveryStatus::Pending)
            .count();
        metrics.deliveries_pending.set(pending as i64);

        Self {
            deliveries: DeliveryStore::new(initial),
            drafts: DashMap::new(),
            confirmations: DashMap::new(),
            geocoder: collaborators.geocoder,
            photos: collaborators.photos,
            credentials: collaborators.credentials,
            delivery_events_tx,
            options,
            metrics,
        }
    }

    // Confirmations of one delivery run one at a time, from the pending check
    // through the photo copy to the store update.
    pub fn confirmation_lock(&self, delivery_id: &str) -> Arc<Mutex<()>> {
        self.confirmations
            .entry(delivery_id.to_string())
            .or_default()
            .clone()
    }

    pub fn publish(&self, event: DeliveryEvent) {
        // No subscribers is fine.
        let _ = self.delivery_events_tx.send(event);
    }
}
