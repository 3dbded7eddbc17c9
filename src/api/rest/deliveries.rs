use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::delivery::{filter_by_status, Delivery, DeliveryStatus};
use crate::state::AppState;
use crate::workflow::confirmation::{self, CheckIn, ConfirmationOutcome};

pub fn router(max_photo_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", get(list_deliveries))
        .route("/deliveries/:id", get(get_delivery))
        .route("/deliveries/:id/check-in", get(check_in))
        .route(
            "/deliveries/:id/photo",
            post(capture_photo).layer(DefaultBodyLimit::max(max_photo_bytes)),
        )
        .route("/deliveries/:id/complete", post(complete_delivery))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<DeliveryStatus>,
}

#[derive(Deserialize)]
pub struct CheckInQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub photo: Option<String>,
}

#[derive(Serialize)]
pub struct CapturedPhoto {
    pub reference: String,
}

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Delivery>> {
    let snapshot = state.deliveries.snapshot().await;
    let deliveries = match query.status {
        Some(status) => filter_by_status(&snapshot, status).cloned().collect(),
        None => snapshot.as_ref().clone(),
    };
    Json(deliveries)
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Delivery>, AppError> {
    state
        .deliveries
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("delivery {id} not found")))
}

async fn check_in(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CheckInQuery>,
) -> Result<Json<CheckIn>, AppError> {
    let current_location = match (query.latitude, query.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
        (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "latitude and longitude must be sent together".to_string(),
            ));
        }
    };

    let view = confirmation::check_in(&state, &id, current_location).await?;
    Ok(Json(view))
}

async fn capture_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CapturedPhoto>, AppError> {
    let reference = confirmation::capture_photo(&state, &id, &body).await?;
    Ok(Json(CapturedPhoto { reference }))
}

async fn complete_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<CompleteRequest>,
) -> Result<Json<ConfirmationOutcome>, AppError> {
    let outcome = confirmation::confirm_delivery(&state, &id, payload.photo).await?;
    Ok(Json(outcome))
}
