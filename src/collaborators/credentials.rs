use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    #[serde(default)]
    pub has_logged_in_before: bool,
}

impl StoredCredentials {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        match (&self.email, &self.password_hash) {
            (Some(stored_email), Some(stored_hash)) => {
                stored_email == email && *stored_hash == hash_password(password)
            }
            _ => false,
        }
    }
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<StoredCredentials, AppError>;
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), AppError>;
}

pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<StoredCredentials, AppError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredCredentials::default());
            }
            Err(err) => {
                return Err(AppError::CollaboratorUnavailable(format!(
                    "failed to read credentials: {err}"
                )));
            }
        };

        serde_json::from_slice(&raw)
            .map_err(|err| AppError::Internal(format!("corrupt credentials file: {err}")))
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|err| {
                AppError::CollaboratorUnavailable(format!("failed to create credentials dir: {err}"))
            })?;
        }

        let body = serde_json::to_vec_pretty(credentials)
            .map_err(|err| AppError::Internal(format!("failed to encode credentials: {err}")))?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).await.map_err(|err| {
            AppError::CollaboratorUnavailable(format!("failed to write credentials: {err}"))
        })?;
        fs::rename(&staging, &self.path).await.map_err(|err| {
            AppError::CollaboratorUnavailable(format!("failed to write credentials: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_account() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        assert_eq!(store.load().await.unwrap(), StoredCredentials::default());
    }

    #[tokio::test]
    async fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credentials.json"));

        let credentials = StoredCredentials {
            email: Some("courier@example.com".to_string()),
            password_hash: Some(hash_password("s3cret")),
            has_logged_in_before: true,
        };
        store.save(&credentials).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, credentials);
        assert!(loaded.matches("courier@example.com", "s3cret"));
        assert!(!loaded.matches("courier@example.com", "wrong"));
    }

    #[test]
    fn password_is_not_stored_in_clear() {
        let hash = hash_password("s3cret");
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, "s3cret");
    }
}
