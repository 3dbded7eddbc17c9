pub mod credentials;
pub mod geocoding;
pub mod photos;
