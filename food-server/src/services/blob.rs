//! Blob storage for uploaded images
//!
//! [`BlobStore::put`] stores bytes under a logical folder and returns the
//! public URL; [`BlobStore::delete`] takes that URL back. Object names are
//! the SHA-256 of the content, so re-uploading the same image is idempotent.
//!
//! - [`LocalBlobStore`]: files under `WORK_DIR/uploads`, served at `/uploads/*`
//! - [`S3BlobStore`]: Amazon S3, `https://{bucket}.s3.amazonaws.com/{key}`

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("URL does not belong to this store: {0}")]
    ForeignUrl(String),

    #[error("Blob storage I/O failed: {0}")]
    Io(String),

    #[error("Blob upload failed: {0}")]
    Upstream(String),
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidPath(_) | BlobError::ForeignUrl(_) => AppError::validation(err.to_string()),
            BlobError::Io(_) | BlobError::Upstream(_) => {
                AppError::with_message(ErrorCode::FileStorageFailed, err.to_string())
            }
        }
    }
}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(err.to_string())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `folder` with the given extension; returns the URL
    async fn put(&self, folder: &str, extension: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError>;

    async fn delete(&self, url: &str) -> Result<(), BlobError>;
}

/// `{folder}/{sha256}.{ext}`
pub fn content_key(folder: &str, extension: &str, bytes: &[u8]) -> Result<String, BlobError> {
    let valid_folder = !folder.is_empty()
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid_folder {
        return Err(BlobError::InvalidPath(folder.to_string()));
    }
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(BlobError::InvalidPath(extension.to_string()));
    }
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Ok(format!("{folder}/{}.{extension}", hex::encode(hasher.finalize())))
}

// =========================================================================
// Local filesystem
// =========================================================================

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// `root` is the uploads directory; `base_url` its public prefix
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Result<&'a str, BlobError> {
        let key = url
            .strip_prefix(&self.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;
        // no traversal out of the uploads root
        let safe = Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(BlobError::InvalidPath(key.to_string()));
        }
        Ok(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, folder: &str, extension: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String, BlobError> {
        let key = content_key(folder, extension, &bytes)?;
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key = %key, "Blob stored locally");
        Ok(format!("{}/{key}", self.base_url))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let key = self.key_from_url(url)?;
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =========================================================================
// S3
// =========================================================================

#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn url_prefix(&self) -> String {
        format!("https://{}.s3.amazonaws.com/", self.bucket)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, folder: &str, extension: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError> {
        let key = content_key(folder, extension, &bytes)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(bytes.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "S3 upload failed");
                BlobError::Upstream(e.to_string())
            })?;
        Ok(format!("{}{key}", self.url_prefix()))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let key = url
            .strip_prefix(&self.url_prefix())
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::Upstream(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_stable() {
        let a = content_key("menu_covers", "jpg", b"img").unwrap();
        let b = content_key("menu_covers", "jpg", b"img").unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("menu_covers/"));
        assert!(a.ends_with(".jpg"));
        assert!(content_key("../etc", "jpg", b"x").is_err());
        assert!(content_key("menu", "j/pg", b"x").is_err());
    }

    #[tokio::test]
    async fn test_local_put_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:8000/uploads/");

        let url = store
            .put("avatars", "png", b"fake-png".to_vec(), "image/png")
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8000/uploads/avatars/"));

        let key = url.trim_start_matches("http://localhost:8000/uploads/");
        assert!(dir.path().join(key).exists());

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join(key).exists());
        // deleting twice is fine
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_rejects_foreign_and_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads");
        assert!(matches!(
            store.delete("https://elsewhere/x.png").await,
            Err(BlobError::ForeignUrl(_))
        ));
        assert!(matches!(
            store.delete("/uploads/../secret").await,
            Err(BlobError::InvalidPath(_))
        ));
    }
}
