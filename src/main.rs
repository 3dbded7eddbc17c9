use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use delivery_tracker::api;
use delivery_tracker::collaborators::credentials::FileCredentialStore;
use delivery_tracker::collaborators::geocoding::{DisabledGeocoder, Geocoder, GoogleGeocoder};
use delivery_tracker::collaborators::photos::FsPhotoStorage;
use delivery_tracker::config::Config;
use delivery_tracker::error::AppError;
use delivery_tracker::models::delivery::seed_deliveries;
use delivery_tracker::state::{AppState, Collaborators, StateOptions};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let photos = FsPhotoStorage::new(config.photos_dir.clone(), config.captures_dir.clone());
    photos.ensure_dirs().await?;

    let geocoder: Arc<dyn Geocoder> = match &config.geocoding_api_key {
        Some(key) => Arc::new(GoogleGeocoder::new(
            config.geocoding_url.clone(),
            key.clone(),
            Duration::from_secs(config.geocoding_timeout_secs),
        )?),
        None => {
            tracing::warn!("GEOCODING_API_KEY not set; address verification is disabled");
            Arc::new(DisabledGeocoder)
        }
    };

    let initial = if config.seed_demo_deliveries {
        seed_deliveries()
    } else {
        Vec::new()
    };

    let app_state = AppState::new(
        Collaborators {
            geocoder,
            photos: Arc::new(photos),
            credentials: Arc::new(FileCredentialStore::new(config.credentials_path.clone())),
        },
        initial,
        StateOptions {
            event_buffer_size: config.event_buffer_size,
            require_delivery_photo: config.require_delivery_photo,
            max_photo_bytes: config.max_photo_bytes,
        },
    );

    let app = api::rest::router(Arc::new(app_state));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        require_photo = config.require_delivery_photo,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
