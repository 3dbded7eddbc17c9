use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::geo::Coordinate;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| AppError::CollaboratorUnavailable(format!("geocoding request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(AppError::CollaboratorUnavailable(format!(
                "geocoding service returned {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|err| {
            AppError::CollaboratorUnavailable(format!("invalid geocoding response: {err}"))
        })?;

        coordinate_from_response(body)
    }
}

fn coordinate_from_response(body: GeocodeResponse) -> Result<Option<Coordinate>, AppError> {
    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" | "" => {}
        other => {
            warn!(status = other, "geocoding service rejected request");
            return Err(AppError::CollaboratorUnavailable(format!(
                "geocoding service status {other}: {}",
                body.error_message.unwrap_or_default()
            )));
        }
    }

    let coordinate = body
        .results
        .into_iter()
        .next()
        .map(|result| Coordinate::new(result.geometry.location.lat, result.geometry.location.lng));

    debug!(found = coordinate.is_some(), "geocoding lookup finished");
    Ok(coordinate)
}

pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinate>, AppError> {
        Err(AppError::CollaboratorUnavailable(
            "geocoding is not configured".to_string(),
        ))
    }
}
