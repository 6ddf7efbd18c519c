use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{
    errors::AppError,
    repositories::blob::{BlobMetadata, BlobStorage},
    storage::paths::MediaUrls,
};

/// Blobs stored as files under `root`, served back through `/media`.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    urls: MediaUrls,
}

impl LocalBlobStorage {
    pub fn new(root: impl Into<PathBuf>, media_base_url: &str) -> Result<Self, AppError> {
        Ok(LocalBlobStorage {
            root: root.into(),
            urls: MediaUrls::new(media_base_url)?,
        })
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = self
            .urls
            .resolve(path)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid blob path: {path}")))?;
        Ok(self.root.join(relative))
    }

    fn relative(&self, full: &Path) -> Option<String> {
        let rel = full.strip_prefix(&self.root).ok()?;
        let parts = rel
            .components()
            .map(|c| c.as_os_str().to_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("/"))
    }

    /// Removes directories left empty by a delete, stopping at the root.
    async fn prune_empty_dirs(&self, mut dir: Option<&Path>) {
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(current).await.is_err() {
                break;
            }
            dir = current.parent();
        }
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn check_connection(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, metadata: BlobMetadata) -> Result<(), AppError> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, bytes).await?;

        tracing::debug!(path, content_type = %metadata.content_type, "Stored blob");
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, AppError> {
        let full = self.full_path(path)?;
        if !fs::try_exists(&full).await? {
            return Err(AppError::NotFound(format!("Blob {path}")));
        }
        Ok(self.urls.url_for(path))
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        let full = self.full_path(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path_or_url: &str) -> Result<(), AppError> {
        let full = self.full_path(path_or_url)?;
        fs::remove_file(&full).await?;
        self.prune_empty_dirs(full.parent()).await;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let start = self.root.join(prefix.trim_matches('/'));
        let mut pending = vec![start];
        let mut found = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(relative) = self.relative(&path) {
                    found.push(relative);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    fn resolve_path(&self, path_or_url: &str) -> Option<String> {
        self.urls.resolve(path_or_url)
    }
}
