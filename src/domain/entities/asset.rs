use std::fmt;

use uuid::Uuid;

use crate::{errors::AppError, utils::image::sniff_image_type};

/// A file picked by the user that has not been uploaded yet.
#[derive(Clone)]
pub struct StagedFile {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub preview_url: String,
}

impl StagedFile {
    /// Stages `bytes` after checking they hold an image. Nothing leaves the process.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AppError> {
        let file_name = file_name.into();
        let content_type = sniff_image_type(&bytes)?;
        let id = Uuid::new_v4();
        let preview_url = format!("staged://{}/{}", id, urlencoding::encode(&file_name));

        Ok(StagedFile {
            id,
            file_name,
            content_type,
            bytes,
            preview_url,
        })
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// One position in a project's screenshot list.
#[derive(Debug, Clone)]
pub enum ScreenshotSlot {
    Persisted { id: Uuid, url: String },
    Staged(StagedFile),
}

impl ScreenshotSlot {
    pub fn persisted(url: impl Into<String>) -> Self {
        ScreenshotSlot::Persisted {
            id: Uuid::new_v4(),
            url: url.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ScreenshotSlot::Persisted { id, .. } => *id,
            ScreenshotSlot::Staged(file) => file.id,
        }
    }

    pub fn preview_url(&self) -> &str {
        match self {
            ScreenshotSlot::Persisted { url, .. } => url,
            ScreenshotSlot::Staged(file) => &file.preview_url,
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self, ScreenshotSlot::Staged(_))
    }
}
