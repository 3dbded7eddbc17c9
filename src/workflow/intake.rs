use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::address::{format_address, AddressDraft, AddressPatch};
use crate::models::delivery::{create_delivery, new_delivery_id, Delivery};
use crate::models::event::{DeliveryEvent, DeliveryEventKind};
use crate::state::AppState;

pub fn open_draft(state: &AppState) -> (Uuid, AddressDraft) {
    let id = Uuid::new_v4();
    let draft = AddressDraft::default();
    state.drafts.insert(id, draft.clone());
    (id, draft)
}

pub fn get_draft(state: &AppState, id: Uuid) -> Result<AddressDraft, AppError> {
    state
        .drafts
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| draft_not_found(id))
}

pub fn update_draft(
    state: &AppState,
    id: Uuid,
    patch: AddressPatch,
) -> Result<AddressDraft, AppError> {
    let mut draft = state.drafts.get_mut(&id).ok_or_else(|| draft_not_found(id))?;
    draft.apply(patch);
    Ok(draft.clone())
}

pub fn discard_draft(state: &AppState, id: Uuid) -> Result<(), AppError> {
    state
        .drafts
        .remove(&id)
        .map(|_| ())
        .ok_or_else(|| draft_not_found(id))
}

pub async fn verify_draft(state: &AppState, id: Uuid) -> Result<AddressDraft, AppError> {
    let draft = get_draft(state, id)?;
    draft.ensure_complete()?;

    let address = format_address(&draft);
    let coordinate = resolve_address(state, &address).await?;

    let mut current = state.drafts.get_mut(&id).ok_or_else(|| draft_not_found(id))?;
    if format_address(&current) != address {
        return Err(AppError::Precondition(format!(
            "draft {id} changed while its address was being verified"
        )));
    }
    current.set_coordinate(coordinate);
    Ok(current.clone())
}

pub async fn submit_draft(state: &AppState, id: Uuid) -> Result<Delivery, AppError> {
    let draft = get_draft(state, id)?;
    draft.ensure_complete()?;

    let address = format_address(&draft);
    let coordinate = match draft.coordinate() {
        Some(coordinate) => coordinate,
        None => resolve_address(state, &address).await?,
    };

    let (_, consumed) = state.drafts.remove(&id).ok_or_else(|| draft_not_found(id))?;
    if format_address(&consumed) != address {
        state.drafts.insert(id, consumed);
        return Err(AppError::Precondition(format!(
            "draft {id} changed while it was being submitted"
        )));
    }

    let delivery = create_delivery(new_delivery_id(), address, coordinate);
    state.deliveries.append(delivery.clone()).await?;

    state.metrics.deliveries_created_total.inc();
    state.metrics.deliveries_pending.inc();
    state.publish(DeliveryEvent::new(DeliveryEventKind::Created, delivery.clone()));

    info!(delivery_id = %delivery.id, address = %delivery.address, "delivery created");
    Ok(delivery)
}

async fn resolve_address(state: &AppState, address: &str) -> Result<Coordinate, AppError> {
    let start = Instant::now();
    let result = state.geocoder.geocode(address).await;
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(Some(coordinate)) => {
            state.metrics.observe_geocoding("found", elapsed);
            Ok(coordinate)
        }
        Ok(None) => {
            state.metrics.observe_geocoding("not_found", elapsed);
            warn!(address, "address could not be geocoded");
            Err(AppError::CollaboratorUnavailable(format!(
                "no location found for address: {address}"
            )))
        }
        Err(err) => {
            state.metrics.observe_geocoding("error", elapsed);
            warn!(error = %err, address, "geocoding failed");
            Err(err)
        }
    }
}

fn draft_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("draft {id} not found"))
}
