use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;

pub const PHOTO_ROUTE: &str = "/photos";

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    async fn stage(&self, delivery_id: &str, image: &[u8]) -> Result<String, AppError>;

    async fn persist(&self, delivery_id: &str, source: &str) -> Result<String, AppError>;

    fn served_dir(&self) -> Option<&Path> {
        None
    }
}

pub fn photo_file_name(delivery_id: &str) -> Result<String, AppError> {
    let valid = !delivery_id.is_empty()
        && delivery_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::Validation(format!(
            "delivery id {delivery_id:?} cannot name a photo file"
        )));
    }
    Ok(format!("delivery_{delivery_id}.jpg"))
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

pub struct FsPhotoStorage {
    photos_dir: PathBuf,
    captures_dir: PathBuf,
}

impl FsPhotoStorage {
    pub fn new(photos_dir: impl Into<PathBuf>, captures_dir: impl Into<PathBuf>) -> Self {
        Self {
            photos_dir: photos_dir.into(),
            captures_dir: captures_dir.into(),
        }
    }

    pub async fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [&self.photos_dir, &self.captures_dir] {
            fs::create_dir_all(dir).await.map_err(|err| {
                AppError::Internal(format!("failed to create {}: {err}", dir.display()))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl PhotoStorage for FsPhotoStorage {
    async fn stage(&self, delivery_id: &str, image: &[u8]) -> Result<String, AppError> {
        if image.is_empty() {
            return Err(AppError::Validation("photo is empty".to_string()));
        }
        photo_file_name(delivery_id)?;
        self.ensure_dirs().await?;

        let capture = format!("capture_{delivery_id}_{}.jpg", Uuid::new_v4().simple());
        let path = self.captures_dir.join(&capture);
        fs::write(&path, image).await.map_err(|err| {
            AppError::CollaboratorUnavailable(format!("failed to store capture: {err}"))
        })?;

        debug!(delivery_id, capture = %capture, "capture staged");
        Ok(capture)
    }

    async fn persist(&self, delivery_id: &str, source: &str) -> Result<String, AppError> {
        if is_remote(source) {
            return Ok(source.to_string());
        }

        // Only captures staged by this storage may be copied.
        if !is_plain_file_name(source) {
            return Err(AppError::Validation(format!(
                "photo {source} was not captured by this service"
            )));
        }

        let file_name = photo_file_name(delivery_id)?;
        let source_path = self.captures_dir.join(source);
        if !fs::try_exists(&source_path).await.unwrap_or(false) {
            return Err(AppError::CollaboratorUnavailable(format!(
                "capture {source} is not available"
            )));
        }
        self.ensure_dirs().await?;

        let target = self.photos_dir.join(&file_name);
        if fs::try_exists(&target).await.unwrap_or(false) {
            fs::remove_file(&target).await.map_err(|err| {
                AppError::CollaboratorUnavailable(format!("failed to replace photo: {err}"))
            })?;
        }

        fs::copy(&source_path, &target).await.map_err(|err| {
            AppError::CollaboratorUnavailable(format!("failed to save photo: {err}"))
        })?;

        info!(delivery_id, path = %target.display(), "delivery photo saved");
        Ok(format!("{PHOTO_ROUTE}/{file_name}"))
    }

    fn served_dir(&self) -> Option<&Path> {
        Some(&self.photos_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> FsPhotoStorage {
        FsPhotoStorage::new(root.join("photos"), root.join("captures"))
    }

    #[test]
    fn file_name_is_derived_from_id() {
        assert_eq!(photo_file_name("42").unwrap(), "delivery_42.jpg");
        assert!(photo_file_name("../etc").is_err());
        assert!(photo_file_name("").is_err());
    }

    #[tokio::test]
    async fn persist_overwrites_previous_photo() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let first = storage.stage("7", b"first").await.unwrap();
        assert!(!first.contains('/'));
        let saved = storage.persist("7", &first).await.unwrap();
        assert_eq!(saved, "/photos/delivery_7.jpg");

        let second = storage.stage("7", b"second").await.unwrap();
        let saved_again = storage.persist("7", &second).await.unwrap();
        assert_eq!(saved, saved_again);

        let on_disk = dir.path().join("photos").join("delivery_7.jpg");
        assert_eq!(fs::read(&on_disk).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn remote_sources_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://example.com/photo.jpg";
        assert_eq!(storage(dir.path()).persist("2", url).await.unwrap(), url);
    }

    #[tokio::test]
    async fn missing_capture_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        storage.ensure_dirs().await.unwrap();

        let result = storage.persist("1", "nope.jpg").await;
        assert!(matches!(result, Err(AppError::CollaboratorUnavailable(_))));
    }

    #[tokio::test]
    async fn paths_outside_captures_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        storage.ensure_dirs().await.unwrap();

        let outside = dir.path().join("secret.txt");
        fs::write(&outside, b"secret").await.unwrap();
        let absolute = outside.to_string_lossy().into_owned();

        for source in ["../secret.txt", absolute.as_str(), ".."] {
            let result = storage.persist("1", source).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{source}");
        }
    }

    #[tokio::test]
    async fn empty_capture_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = storage(dir.path()).stage("1", b"").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn serves_the_photos_directory() {
        let storage = FsPhotoStorage::new("data/photos", "data/captures");
        assert_eq!(storage.served_dir(), Some(Path::new("data/photos")));
    }
}
