use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::geo::{distance_km, distance_meters, Coordinate};
use crate::models::delivery::{complete_delivery, Delivery};
use crate::models::event::{DeliveryEvent, DeliveryEventKind};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CheckIn {
    pub delivery: Delivery,
    pub current_location: Option<Coordinate>,
    pub distance_km: Option<f64>,
    pub distance_meters: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationOutcome {
    pub delivery: Delivery,
    pub photo_saved: bool,
}

pub async fn check_in(
    state: &AppState,
    id: &str,
    current_location: Option<Coordinate>,
) -> Result<CheckIn, AppError> {
    let delivery = find(state, id).await?;

    let target = delivery.coordinate();
    Ok(CheckIn {
        distance_km: current_location.map(|here| distance_km(&here, &target)),
        distance_meters: current_location.map(|here| distance_meters(&here, &target)),
        current_location,
        delivery,
    })
}

pub async fn capture_photo(state: &AppState, id: &str, image: &[u8]) -> Result<String, AppError> {
    let delivery = find(state, id).await?;
    if delivery.is_completed() {
        return Err(AppError::Precondition(format!(
            "delivery {id} is already completed"
        )));
    }
    state.photos.stage(&delivery.id, image).await
}

pub async fn confirm_delivery(
    state: &AppState,
    id: &str,
    photo: Option<String>,
) -> Result<ConfirmationOutcome, AppError> {
    find(state, id).await?;
    let lock = state.confirmation_lock(id);
    let _guard = lock.lock().await;

    let delivery = find(state, id).await?;
    if delivery.is_completed() {
        return Err(AppError::Precondition(format!(
            "delivery {id} is already completed"
        )));
    }

    let photo = photo.filter(|reference| !reference.trim().is_empty());
    if photo.is_none() && delivery.photo.is_none() && state.options.require_delivery_photo {
        return Err(AppError::Validation(format!(
            "delivery {id} needs a photo before it can be confirmed"
        )));
    }

    let saved = match photo {
        Some(source) => Some(state.photos.persist(&delivery.id, &source).await?),
        None => None,
    };
    let photo_saved = saved.is_some();

    let completed = state
        .deliveries
        .update(id, |current| complete_delivery(current, saved))
        .await?;

    state.metrics.deliveries_completed_total.inc();
    state.metrics.deliveries_pending.dec();
    state.publish(DeliveryEvent::new(
        DeliveryEventKind::Completed,
        completed.clone(),
    ));

    info!(delivery_id = %completed.id, photo_saved, "delivery confirmed");

    Ok(ConfirmationOutcome {
        delivery: completed,
        photo_saved,
    })
}

async fn find(state: &AppState, id: &str) -> Result<Delivery, AppError> {
    state
        .deliveries
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))
}
