use std::collections::HashMap;

use chrono::Utc;
use futures::future::{join_all, try_join_all};
use tokio::sync::watch;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{SCREENSHOTS_PROGRESS, THUMBNAIL_PROGRESS},
    entities::{
        asset::{ScreenshotSlot, StagedFile},
        project::{parse_technologies, Project, ProjectDraft, ProjectForm, ProjectInsert},
        session::Session,
    },
    errors::{AppError, FieldError},
    repositories::{
        blob::{BlobMetadata, BlobStorage},
        project::ProjectRepository,
    },
    storage::{
        in_flight::InFlightUploads,
        paths::{project_namespace, screenshot_path, thumbnail_path},
    },
    utils::image::{compress_image_blocking, ImageSettings},
};

/// Edits one project, in create mode (no id yet) or edit mode.
///
/// Picked images are only staged. `submit` compresses and uploads them,
/// deletes removed screenshots, then writes the project document once.
pub struct ProjectEditor<P, B>
where
    P: ProjectRepository,
    B: BlobStorage,
{
    projects: P,
    blobs: B,
    session: Session,
    images: ImageSettings,
    draft: ProjectDraft,
    last_error: Option<String>,
    progress: watch::Sender<f32>,
    in_flight: InFlightUploads,
}

impl<P, B> ProjectEditor<P, B>
where
    P: ProjectRepository,
    B: BlobStorage,
{
    pub fn new(projects: P, blobs: B, session: Session, images: ImageSettings) -> Self {
        let draft = ProjectDraft::new_for(session.user_id().unwrap_or_default());
        let (progress, _) = watch::channel(0.0);
        ProjectEditor {
            projects,
            blobs,
            session,
            images,
            draft,
            last_error: None,
            progress,
            in_flight: InFlightUploads::new(),
        }
    }

    /// Shares the in-flight folder registry with the orphan sweep.
    pub fn tracking(mut self, in_flight: InFlightUploads) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Upload progress in percent while `submit` runs, 0 otherwise.
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.progress.subscribe()
    }

    /// Starts an empty draft when `id` is `None`, otherwise loads that
    /// project for editing.
    pub async fn load(&mut self, id: Option<Uuid>) -> Result<&ProjectDraft, AppError> {
        let result = self.fetch(id).await;
        self.record(result)?;
        Ok(&self.draft)
    }

    async fn fetch(&mut self, id: Option<Uuid>) -> Result<(), AppError> {
        let user_id = self.session.require_user()?.user_id.clone();

        self.draft = match id {
            None => ProjectDraft::new_for(user_id),
            Some(id) => {
                let project = self
                    .projects
                    .get_project(&id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Project".into()))?;

                if project.owner_id != user_id {
                    tracing::warn!(%id, %user_id, "Refused to edit a project owned by someone else");
                    return Err(AppError::ForbiddenAccess);
                }
                ProjectDraft::from(project)
            }
        };
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_project_url(&mut self, url: impl Into<String>) {
        self.draft.project_url = url.into();
    }

    pub fn set_technologies(&mut self, raw: &str) {
        self.draft.technologies = parse_technologies(raw);
    }

    /// Copies the text fields of a submitted form into the draft and drops
    /// the screenshots it lists as removed.
    pub fn apply_form(&mut self, form: ProjectForm) -> Result<(), AppError> {
        form.validate()?;

        self.set_title(form.title.trim());
        self.set_description(form.description);
        self.set_project_url(form.project_url.trim());
        self.set_technologies(&form.technologies);

        for url in &form.removed_screenshots {
            self.remove_screenshot_by_url(url)?;
        }
        Ok(())
    }

    /// Replaces any staged thumbnail. Returns the preview URL.
    pub fn stage_thumbnail(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<&str, AppError> {
        let file = StagedFile::new(file_name, bytes)?;
        let staged = self.draft.staged_thumbnail.insert(file);
        Ok(staged.preview_url.as_str())
    }

    /// Appends one slot per file. Nothing is staged if any file is not an image.
    pub fn stage_screenshots(&mut self, files: Vec<(String, Vec<u8>)>) -> Result<Vec<Uuid>, AppError> {
        let staged = files
            .into_iter()
            .map(|(name, bytes)| StagedFile::new(name, bytes))
            .collect::<Result<Vec<_>, _>>()?;

        let ids = staged.iter().map(|file| file.id).collect();
        self.draft
            .screenshots
            .extend(staged.into_iter().map(ScreenshotSlot::Staged));
        Ok(ids)
    }

    pub fn remove_screenshot(&mut self, slot_id: Uuid) -> Result<(), AppError> {
        let index = self
            .draft
            .screenshots
            .iter()
            .position(|slot| slot.id() == slot_id)
            .ok_or_else(|| AppError::NotFound(format!("Screenshot {slot_id}")))?;
        self.remove_screenshot_at(index)
    }

    /// A persisted screenshot is queued for deletion on submit. A staged one
    /// is just dropped.
    pub fn remove_screenshot_at(&mut self, index: usize) -> Result<(), AppError> {
        if index >= self.draft.screenshots.len() {
            return Err(AppError::NotFound(format!("Screenshot at position {index}")));
        }

        if let ScreenshotSlot::Persisted { url, .. } = self.draft.screenshots.remove(index) {
            self.draft.pending_deletions.push(url);
        }
        Ok(())
    }

    pub fn remove_screenshot_by_url(&mut self, url: &str) -> Result<(), AppError> {
        let index = self
            .draft
            .screenshots
            .iter()
            .position(|slot| matches!(slot, ScreenshotSlot::Persisted { url: u, .. } if u == url))
            .ok_or_else(|| AppError::NotFound(format!("Screenshot {url}")))?;
        self.remove_screenshot_at(index)
    }

    pub async fn submit(&mut self) -> Result<Project, AppError> {
        let result = self.write().await;
        self.progress.send_replace(0.0);

        let project = self.record(result)?;
        self.draft = ProjectDraft::from(project.clone());
        Ok(project)
    }

    async fn write(&self) -> Result<Project, AppError> {
        let user_id = &self.session.require_user()?.user_id;
        if self.draft.is_edit_mode() && &self.draft.owner_id != user_id {
            return Err(AppError::ForbiddenAccess);
        }

        let title = self.draft.title.trim();
        if title.is_empty() {
            return Err(AppError::ValidationError(vec![FieldError {
                field: "title".into(),
                message: "Title is required".into(),
            }]));
        }

        let namespace = project_namespace(&self.draft.owner_id, title);
        let _uploading = self.in_flight.begin(&namespace);

        let (thumbnail_url, uploaded) = self.upload_staged(&namespace).await?;
        let replaced_thumbnail = thumbnail_url.as_ref().and(self.draft.thumbnail.as_deref());
        self.delete_pending(replaced_thumbnail).await;

        let screenshots = self
            .draft
            .screenshots
            .iter()
            .filter_map(|slot| match slot {
                ScreenshotSlot::Persisted { url, .. } => Some(url.clone()),
                ScreenshotSlot::Staged(file) => uploaded.get(&file.id).cloned(),
            })
            .collect();

        let now = Utc::now();
        let insert = ProjectInsert {
            owner_id: self.draft.owner_id.clone(),
            title: title.to_string(),
            description: self.draft.description.clone(),
            technologies: self.draft.technologies.clone(),
            thumbnail: thumbnail_url.or_else(|| self.draft.thumbnail.clone()),
            screenshots,
            project_url: self.draft.project_url.clone(),
            updated_at: now,
        };

        let project = match self.draft.id {
            Some(id) => {
                self.projects.update_project(&id, &insert).await?;
                insert.into_project(id, self.draft.created_at.unwrap_or(now))
            }
            None => {
                let id = self.projects.create_project(&insert).await?;
                insert.into_project(id, now)
            }
        };

        tracing::info!(project_id = %project.id, owner = %project.owner_id, "Project saved");
        Ok(project)
    }

    /// Uploads the staged thumbnail and screenshots side by side. The first
    /// failure aborts the whole batch.
    async fn upload_staged(
        &self,
        namespace: &str,
    ) -> Result<(Option<String>, HashMap<Uuid, String>), AppError> {
        let staged: Vec<&StagedFile> = self.draft.staged_screenshots().collect();
        let share = if staged.is_empty() {
            0.0
        } else {
            SCREENSHOTS_PROGRESS / staged.len() as f32
        };

        let thumbnail = async {
            match &self.draft.staged_thumbnail {
                Some(file) => {
                    let url = self.upload_asset(file, thumbnail_path(namespace, &file.id)).await?;
                    self.advance(THUMBNAIL_PROGRESS);
                    Ok::<_, AppError>(Some(url))
                }
                None => Ok(None),
            }
        };

        let screenshots = try_join_all(staged.into_iter().map(|file| async move {
            let url = self
                .upload_asset(file, screenshot_path(namespace, &file.id))
                .await?;
            self.advance(share);
            Ok::<_, AppError>((file.id, url))
        }));

        let (thumbnail_url, uploaded) = futures::try_join!(thumbnail, screenshots)?;
        Ok((thumbnail_url, uploaded.into_iter().collect()))
    }

    async fn upload_asset(&self, file: &StagedFile, path: String) -> Result<String, AppError> {
        let compressed = compress_image_blocking(file.bytes.clone(), self.images).await?;
        tracing::debug!(
            %path,
            original = file.bytes.len(),
            compressed = compressed.bytes.len(),
            "Uploading image"
        );

        self.blobs
            .upload(&path, compressed.bytes, BlobMetadata::new(compressed.content_type))
            .await?;
        self.blobs.download_url(&path).await
    }

    /// Removed screenshots plus the thumbnail a new upload replaced.
    async fn delete_pending(&self, replaced_thumbnail: Option<&str>) {
        let deletions = self
            .draft
            .pending_deletions
            .iter()
            .map(String::as_str)
            .chain(replaced_thumbnail)
            .map(|url| async move { (url, self.blobs.delete(url).await) });

        for (url, result) in join_all(deletions).await {
            match result {
                Ok(()) => tracing::debug!(%url, "Deleted replaced image"),
                Err(AppError::NotFound(_)) => tracing::debug!(%url, "Replaced image was already gone"),
                Err(e) => tracing::warn!(%url, error = %e, "Failed to delete replaced image"),
            }
        }
    }

    fn advance(&self, amount: f32) {
        self.progress.send_modify(|progress| *progress = (*progress + amount).min(100.0));
    }

    fn record<T>(&mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Project editor operation failed");
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
