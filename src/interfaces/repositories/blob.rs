use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMetadata {
    pub content_type: String,
}

impl BlobMetadata {
    pub fn new(content_type: impl Into<String>) -> Self {
        BlobMetadata { content_type: content_type.into() }
    }
}

/// Path-addressed object storage for project images.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Stores `bytes` at `path`, overwriting whatever was there
    async fn upload(&self, path: &str, bytes: Vec<u8>, metadata: BlobMetadata) -> Result<(), AppError>;

    /// Public URL for an uploaded blob
    async fn download_url(&self, path: &str) -> Result<String, AppError>;

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Deletes by storage path or by a URL this store handed out.
    /// A blob that does not exist is `AppError::NotFound`.
    async fn delete(&self, path_or_url: &str) -> Result<(), AppError>;

    /// Every blob path below `prefix`, at any depth
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    /// Maps a download URL back to its storage path. Plain paths pass through.
    fn resolve_path(&self, path_or_url: &str) -> Option<String>;
}

#[async_trait]
impl<T> BlobStorage for Arc<T>
where
    T: BlobStorage + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, metadata: BlobMetadata) -> Result<(), AppError> {
        (**self).upload(path, bytes, metadata).await
    }

    async fn download_url(&self, path: &str) -> Result<String, AppError> {
        (**self).download_url(path).await
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        (**self).get(path).await
    }

    async fn delete(&self, path_or_url: &str) -> Result<(), AppError> {
        (**self).delete(path_or_url).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        (**self).list(prefix).await
    }

    fn resolve_path(&self, path_or_url: &str) -> Option<String> {
        (**self).resolve_path(path_or_url)
    }
}
