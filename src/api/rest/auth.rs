use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::workflow::auth::{self, Authenticated, BiometricStatus};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/biometric", get(biometric_status).post(biometric_login))
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct BiometricRequest {
    pub success: bool,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<Authenticated>, AppError> {
    let account = auth::register(&state, &payload.email, &payload.password).await?;
    Ok(Json(account))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<Authenticated>, AppError> {
    let account = auth::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(account))
}

async fn biometric_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BiometricStatus>, AppError> {
    Ok(Json(auth::biometric_status(&state).await?))
}

async fn biometric_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BiometricRequest>,
) -> Result<Json<Authenticated>, AppError> {
    let account = auth::biometric_login(&state, payload.success).await?;
    Ok(Json(account))
}
