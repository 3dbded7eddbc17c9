use std::env;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_GEOCODING_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    pub photos_dir: PathBuf,
    pub captures_dir: PathBuf,
    pub credentials_path: PathBuf,
    pub geocoding_api_key: Option<String>,
    pub geocoding_url: String,
    pub geocoding_timeout_secs: u64,
    pub require_delivery_photo: bool,
    pub seed_demo_deliveries: bool,
    pub max_photo_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            photos_dir: path_or_default("PHOTOS_DIR", "data/delivery_photos"),
            captures_dir: path_or_default("CAPTURES_DIR", "data/captures"),
            credentials_path: path_or_default("CREDENTIALS_PATH", "data/credentials.json"),
            geocoding_api_key: env::var("GEOCODING_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            geocoding_url: env::var("GEOCODING_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_URL.to_string()),
            geocoding_timeout_secs: parse_or_default("GEOCODING_TIMEOUT_SECS", 10)?,
            require_delivery_photo: parse_or_default("REQUIRE_DELIVERY_PHOTO", true)?,
            seed_demo_deliveries: parse_or_default("SEED_DEMO_DELIVERIES", false)?,
            max_photo_bytes: parse_or_default("MAX_PHOTO_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn path_or_default(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
