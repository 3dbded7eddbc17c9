pub mod auth;
pub mod deliveries;
pub mod drafts;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::collaborators::photos::PHOTO_ROUTE;
use crate::models::delivery::{filter_by_status, DeliveryStatus};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let served_photos = state.photos.served_dir().map(ServeDir::new);

    let router = Router::new()
        .merge(deliveries::router(state.options.max_photo_bytes))
        .merge(drafts::router())
        .merge(auth::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    match served_photos {
        Some(photos) => router.nest_service(PHOTO_ROUTE, photos),
        None => router,
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    pending: usize,
    completed: usize,
    drafts: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.deliveries.snapshot().await;
    let pending = filter_by_status(&snapshot, DeliveryStatus::Pending).count();

    Json(HealthResponse {
        status: "ok",
        pending,
        completed: snapshot.len() - pending,
        drafts: state.drafts.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
