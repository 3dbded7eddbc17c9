use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::delivery::Delivery;

/// Single source of truth for the delivery list.
///
/// Readers get an immutable snapshot; every write builds a new list and swaps
/// it in, so a snapshot never changes under the reader.
#[derive(Default)]
pub struct DeliveryStore {
    deliveries: RwLock<Arc<Vec<Delivery>>>,
}

impl DeliveryStore {
    pub fn new(initial: Vec<Delivery>) -> Self {
        Self {
            deliveries: RwLock::new(Arc::new(initial)),
        }
    }

    pub async fn snapshot(&self) -> Arc<Vec<Delivery>> {
        self.deliveries.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Delivery> {
        self.deliveries
            .read()
            .await
            .iter()
            .find(|delivery| delivery.id == id)
            .cloned()
    }

    pub async fn append(&self, delivery: Delivery) -> Result<(), AppError> {
        let mut guard = self.deliveries.write().await;
        if guard.iter().any(|existing| existing.id == delivery.id) {
            return Err(AppError::Precondition(format!(
                "delivery id {} is already in use",
                delivery.id
            )));
        }

        let mut next = guard.as_ref().clone();
        next.push(delivery);
        *guard = Arc::new(next);
        Ok(())
    }

    pub async fn update<F>(&self, id: &str, transition: F) -> Result<Delivery, AppError>
    where
        F: FnOnce(&Delivery) -> Result<Delivery, AppError>,
    {
        let mut guard = self.deliveries.write().await;
        let index = guard
            .iter()
            .position(|delivery| delivery.id == id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))?;

        let updated = transition(&guard[index])?;

        let mut next = guard.as_ref().clone();
        next[index] = updated.clone();
        *guard = Arc::new(next);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::DeliveryStore;
    use crate::error::AppError;
    use crate::geo::Coordinate;
    use crate::models::delivery::{complete_delivery, create_delivery, DeliveryStatus};

    fn delivery(id: &str) -> crate::models::delivery::Delivery {
        create_delivery(id.to_string(), "Rua A, 1".to_string(), Coordinate::new(0.0, 0.0))
    }

    #[tokio::test]
    async fn snapshots_are_not_affected_by_later_writes() {
        let store = DeliveryStore::new(vec![delivery("a")]);
        let before = store.snapshot().await;

        store.append(delivery("b")).await.unwrap();
        store
            .update("a", |d| complete_delivery(d, None))
            .await
            .unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].status, DeliveryStatus::Pending);

        let after = store.snapshot().await;
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].status, DeliveryStatus::Completed);
        assert_eq!(after[1].id, "b");
    }

    #[tokio::test]
    async fn rejects_duplicate_ids() {
        let store = DeliveryStore::new(vec![delivery("a")]);
        let result = store.append(delivery("a")).await;
        assert!(matches!(result, Err(AppError::Precondition(_))));
        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_transition_leaves_list_untouched() {
        let store = DeliveryStore::new(vec![delivery("a")]);
        store
            .update("a", |d| complete_delivery(d, Some("p.jpg".to_string())))
            .await
            .unwrap();

        let second = store.update("a", |d| complete_delivery(d, None)).await;
        assert!(matches!(second, Err(AppError::Precondition(_))));
        assert_eq!(
            store.get("a").await.unwrap().photo.as_deref(),
            Some("p.jpg")
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = DeliveryStore::default();
        let result = store.update("missing", |d| Ok(d.clone())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
