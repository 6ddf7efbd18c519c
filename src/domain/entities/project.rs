use actix_multipart::form::{json::Json as MpJson, tempfile::TempFile, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::asset::{ScreenshotSlot, StagedFile};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 120;
const MAX_DESCRIPTION_LENGTH: u64 = 5000;

// ───── Document Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub thumbnail: Option<String>,
    pub screenshots: Vec<String>,
    pub project_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields written by a create or an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInsert {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub thumbnail: Option<String>,
    pub screenshots: Vec<String>,
    pub project_url: String,
    pub updated_at: DateTime<Utc>,
}

impl ProjectInsert {
    pub fn into_project(self, id: Uuid, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            technologies: self.technologies,
            thumbnail: self.thumbnail,
            screenshots: self.screenshots,
            project_url: self.project_url,
            created_at,
            updated_at: self.updated_at,
        }
    }
}

// ───── Draft ──────────────────────────────────────────────────────────

/// The editable copy of a project. `id` is `None` until the first save.
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub id: Option<Uuid>,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub project_url: String,
    pub thumbnail: Option<String>,
    pub staged_thumbnail: Option<StagedFile>,
    pub screenshots: Vec<ScreenshotSlot>,
    pub pending_deletions: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProjectDraft {
    pub fn new_for(owner_id: impl Into<String>) -> Self {
        ProjectDraft {
            owner_id: owner_id.into(),
            ..ProjectDraft::default()
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.id.is_some()
    }

    pub fn thumbnail_preview(&self) -> Option<&str> {
        self.staged_thumbnail
            .as_ref()
            .map(|file| file.preview_url.as_str())
            .or(self.thumbnail.as_deref())
    }

    /// Preview URLs in display order, persisted and staged alike.
    pub fn previews(&self) -> Vec<&str> {
        self.screenshots.iter().map(ScreenshotSlot::preview_url).collect()
    }

    pub fn staged_screenshots(&self) -> impl Iterator<Item = &StagedFile> {
        self.screenshots.iter().filter_map(|slot| match slot {
            ScreenshotSlot::Staged(file) => Some(file),
            ScreenshotSlot::Persisted { .. } => None,
        })
    }

    pub fn persisted_count(&self) -> usize {
        self.screenshots.iter().filter(|slot| !slot.is_staged()).count()
    }
}

impl From<Project> for ProjectDraft {
    fn from(project: Project) -> Self {
        ProjectDraft {
            id: Some(project.id),
            owner_id: project.owner_id,
            title: project.title,
            description: project.description,
            technologies: project.technologies,
            project_url: project.project_url,
            thumbnail: project.thumbnail.filter(|url| !url.is_empty()),
            staged_thumbnail: None,
            screenshots: project.screenshots.into_iter().map(ScreenshotSlot::persisted).collect(),
            pending_deletions: Vec::new(),
            created_at: Some(project.created_at),
        }
    }
}

/// Splits comma separated tags into an ordered set: trimmed, no blanks, first
/// occurrence wins.
pub fn parse_technologies(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    tags
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub thumbnail: Option<String>,
    pub screenshots: Vec<String>,
    pub project_url: String,
}

impl From<Project> for ProjectSummary {
    fn from(project: Project) -> Self {
        ProjectSummary {
            id: project.id,
            title: project.title,
            description: project.description,
            technologies: project.technologies,
            thumbnail: project.thumbnail,
            screenshots: project.screenshots,
            project_url: project.project_url,
        }
    }
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProjectForm {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH, message = "Description is required"))]
    pub description: String,

    /// Comma separated, as typed.
    #[serde(default)]
    pub technologies: String,

    #[validate(url(message = "Project URL must be a valid URL"))]
    pub project_url: String,

    /// Persisted screenshot URLs the user removed.
    #[serde(default)]
    pub removed_screenshots: Vec<String>,
}

#[derive(Debug, MultipartForm)]
pub struct ProjectUpload {
    #[multipart(rename = "metadata")]
    pub metadata: MpJson<ProjectForm>,

    #[multipart(rename = "thumbnail")]
    pub thumbnail: Option<TempFile>,

    #[multipart(rename = "screenshots")]
    pub screenshots: Vec<TempFile>,
}
