use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    errors::AppError,
    repositories::blob::{BlobMetadata, BlobStorage},
    storage::paths::MediaUrls,
};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    metadata: BlobMetadata,
}

#[derive(Debug)]
pub struct InMemoryBlobStorage {
    blobs: DashMap<String, StoredBlob>,
    urls: MediaUrls,
}

impl InMemoryBlobStorage {
    pub fn new(media_base_url: &str) -> Result<Self, AppError> {
        Ok(InMemoryBlobStorage {
            blobs: DashMap::new(),
            urls: MediaUrls::new(media_base_url)?,
        })
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.blobs.get(path).map(|b| b.metadata.content_type.clone())
    }

    fn key(&self, path_or_url: &str) -> Result<String, AppError> {
        self.urls
            .resolve(path_or_url)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid blob path: {path_or_url}")))
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, metadata: BlobMetadata) -> Result<(), AppError> {
        let key = self.key(path)?;
        self.blobs.insert(key, StoredBlob { bytes, metadata });
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, AppError> {
        let key = self.key(path)?;
        if !self.blobs.contains_key(&key) {
            return Err(AppError::NotFound(format!("Blob {path}")));
        }
        Ok(self.urls.url_for(&key))
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        let key = self.key(path)?;
        Ok(self.blobs.get(&key).map(|b| b.bytes.clone()))
    }

    async fn delete(&self, path_or_url: &str) -> Result<(), AppError> {
        let key = self.key(path_or_url)?;
        self.blobs
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Blob {key}")))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let dir = prefix.trim_matches('/');
        let mut paths: Vec<String> = self
            .blobs
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|path| dir.is_empty() || path.starts_with(&format!("{dir}/")))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn resolve_path(&self, path_or_url: &str) -> Option<String> {
        self.urls.resolve(path_or_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_respects_folder_boundaries() {
        let storage = InMemoryBlobStorage::new("http://localhost/media").unwrap();
        let meta = BlobMetadata::new("image/jpeg");
        storage.upload("projects/u1/site/thumbnail", vec![1], meta.clone()).await.unwrap();
        storage.upload("projects/u1/site-two/thumbnail", vec![2], meta).await.unwrap();

        let listed = storage.list("projects/u1/site").await.unwrap();
        assert_eq!(listed, vec!["projects/u1/site/thumbnail"]);
        assert_eq!(storage.list("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_accepts_download_urls() {
        let storage = InMemoryBlobStorage::new("http://localhost/media").unwrap();
        storage
            .upload("projects/u1/site/thumbnail", vec![1], BlobMetadata::new("image/jpeg"))
            .await
            .unwrap();

        let url = storage.download_url("projects/u1/site/thumbnail").await.unwrap();
        storage.delete(&url).await.unwrap();

        assert!(storage.is_empty());
        assert!(matches!(storage.delete(&url).await, Err(AppError::NotFound(_))));
    }
}
