use serde::Serialize;
use tracing::{info, warn};

use crate::collaborators::credentials::hash_password;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct Authenticated {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BiometricStatus {
    pub available: bool,
}

pub async fn register(state: &AppState, email: &str, password: &str) -> Result<Authenticated, AppError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let mut credentials = state.credentials.load().await?;
    credentials.email = Some(email.to_string());
    credentials.password_hash = Some(hash_password(password));
    state.credentials.save(&credentials).await?;

    info!(email, "account registered");
    Ok(Authenticated {
        email: email.to_string(),
    })
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<Authenticated, AppError> {
    let email = email.trim();
    let mut credentials = state.credentials.load().await?;

    if !credentials.matches(email, password) {
        warn!(email, "login rejected");
        return Err(AppError::Unauthorized(
            "incorrect email or password".to_string(),
        ));
    }

    if !credentials.has_logged_in_before {
        credentials.has_logged_in_before = true;
        state.credentials.save(&credentials).await?;
    }

    info!(email, "password login succeeded");
    Ok(Authenticated {
        email: email.to_string(),
    })
}

pub async fn biometric_status(state: &AppState) -> Result<BiometricStatus, AppError> {
    let credentials = state.credentials.load().await?;
    Ok(BiometricStatus {
        available: credentials.has_logged_in_before && credentials.email.is_some(),
    })
}

pub async fn biometric_login(
    state: &AppState,
    challenge_passed: bool,
) -> Result<Authenticated, AppError> {
    let credentials = state.credentials.load().await?;

    let email = match credentials.email {
        Some(email) if credentials.has_logged_in_before => email,
        _ => {
            return Err(AppError::Precondition(
                "biometric login requires a previous password login".to_string(),
            ));
        }
    };

    if !challenge_passed {
        warn!(email = %email, "biometric challenge failed");
        return Err(AppError::Unauthorized(
            "biometric authentication failed".to_string(),
        ));
    }

    info!(email = %email, "biometric login succeeded");
    Ok(Authenticated { email })
}
