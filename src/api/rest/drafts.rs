use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::address::{format_address, AddressDraft, AddressPatch};
use crate::models::delivery::Delivery;
use crate::state::AppState;
use crate::workflow::intake;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drafts", post(open_draft))
        .route(
            "/drafts/:id",
            get(get_draft).patch(update_draft).delete(discard_draft),
        )
        .route("/drafts/:id/verify", post(verify_draft))
        .route("/drafts/:id/submit", post(submit_draft))
}

#[derive(Serialize)]
pub struct DraftResponse {
    pub id: Uuid,
    pub draft: AddressDraft,
    pub formatted_address: String,
    pub missing_fields: Vec<&'static str>,
}

impl DraftResponse {
    fn new(id: Uuid, draft: AddressDraft) -> Self {
        Self {
            id,
            formatted_address: format_address(&draft),
            missing_fields: draft.missing_required_fields(),
            draft,
        }
    }
}

async fn open_draft(State(state): State<Arc<AppState>>) -> Json<DraftResponse> {
    let (id, draft) = intake::open_draft(&state);
    Json(DraftResponse::new(id, draft))
}

async fn get_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = intake::get_draft(&state, id)?;
    Ok(Json(DraftResponse::new(id, draft)))
}

async fn update_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AddressPatch>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = intake::update_draft(&state, id, patch)?;
    Ok(Json(DraftResponse::new(id, draft)))
}

async fn discard_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    intake::discard_draft(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn verify_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = intake::verify_draft(&state, id).await?;
    Ok(Json(DraftResponse::new(id, draft)))
}

async fn submit_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = intake::submit_draft(&state, id).await?;
    Ok(Json(delivery))
}
