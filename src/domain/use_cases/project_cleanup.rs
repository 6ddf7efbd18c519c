use std::collections::{BTreeMap, BTreeSet, HashSet};

use futures::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    constants::PROJECTS_PREFIX,
    entities::{project::Project, session::Session},
    errors::AppError,
    repositories::{blob::BlobStorage, project::ProjectRepository},
    storage::{
        in_flight::InFlightUploads,
        paths::{project_namespace, split_namespace, Namespace},
    },
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub document_deleted: bool,
    pub blobs_deleted: usize,
    /// Blobs that were already gone. Not a failure.
    pub blobs_missing: usize,
    pub blobs_failed: usize,
}

impl CleanupReport {
    pub fn absorb(&mut self, other: CleanupReport) {
        self.blobs_deleted += other.blobs_deleted;
        self.blobs_missing += other.blobs_missing;
        self.blobs_failed += other.blobs_failed;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub namespaces_checked: usize,
    pub namespaces_purged: usize,
    pub blobs_deleted: usize,
    pub blobs_failed: usize,
}

/// Removes projects together with their stored images.
#[derive(Clone)]
pub struct ProjectCleanup<P, B>
where
    P: ProjectRepository,
    B: BlobStorage,
{
    projects: P,
    blobs: B,
    in_flight: InFlightUploads,
}

impl<P, B> ProjectCleanup<P, B>
where
    P: ProjectRepository,
    B: BlobStorage,
{
    pub fn new(projects: P, blobs: B) -> Self {
        ProjectCleanup {
            projects,
            blobs,
            in_flight: InFlightUploads::new(),
        }
    }

    /// Shares the in-flight folder registry with the project editors.
    pub fn tracking(mut self, in_flight: InFlightUploads) -> Self {
        self.in_flight = in_flight;
        self
    }

    /// Deletes the project document, then its images. Safe to call again
    /// for a project that is already gone.
    pub async fn delete_project(&self, session: &Session, id: &Uuid) -> Result<CleanupReport, AppError> {
        let user = session.require_user()?;

        let Some(project) = self.projects.get_project(id).await? else {
            tracing::info!(%id, "Project already deleted");
            return Ok(CleanupReport::default());
        };

        if project.owner_id != user.user_id {
            tracing::warn!(%id, user_id = %user.user_id, "Refused to delete a project owned by someone else");
            return Err(AppError::ForbiddenAccess);
        }

        let document_deleted = self.projects.delete_project(id).await?;
        let targets = self.assets_of(&project).await;

        let mut report = self.delete_all(targets).await;
        report.document_deleted = document_deleted;

        tracing::info!(
            %id,
            blobs_deleted = report.blobs_deleted,
            blobs_missing = report.blobs_missing,
            blobs_failed = report.blobs_failed,
            "Project deleted"
        );
        Ok(report)
    }

    /// Every blob stored for `project`: its namespace folder plus any
    /// referenced image living elsewhere, such as under an old title.
    /// Images another project of the same owner still references are kept.
    async fn assets_of(&self, project: &Project) -> BTreeSet<String> {
        let namespace = project_namespace(&project.owner_id, &project.title);

        let siblings = match self.projects.list_projects_by_owner(&project.owner_id).await {
            Ok(projects) => Some(projects.into_iter().filter(|p| p.id != project.id).collect::<Vec<_>>()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not list sibling projects, keeping shared folders");
                None
            }
        };

        let mut targets: BTreeSet<String> = referenced_urls(project)
            .filter_map(|url| self.blobs.resolve_path(url))
            .collect();

        let shares_namespace = siblings.as_ref().is_none_or(|others: &Vec<Project>| {
            others
                .iter()
                .any(|p| project_namespace(&p.owner_id, &p.title) == namespace)
        });

        if !shares_namespace && !self.in_flight.contains(&namespace) {
            match self.blobs.list(&namespace).await {
                Ok(paths) => targets.extend(paths),
                Err(e) => tracing::warn!(%namespace, error = %e, "Could not list project images"),
            }
        }

        let kept: BTreeSet<String> = siblings
            .iter()
            .flatten()
            .flat_map(referenced_urls)
            .filter_map(|url| self.blobs.resolve_path(url))
            .collect();

        targets.retain(|path| !kept.contains(path));
        targets
    }

    /// Purges images in project folders no stored project points to any
    /// more, left behind by renamed titles and interrupted deletions.
    ///
    /// Only paths from the initial listing are touched. Folders with an
    /// upload in flight are skipped, and anything the owner's projects still
    /// reference is kept.
    pub async fn sweep_orphans(&self) -> Result<SweepReport, AppError> {
        let mut folders: BTreeMap<Namespace, Vec<String>> = BTreeMap::new();
        for path in self.blobs.list(PROJECTS_PREFIX).await? {
            if let Some(namespace) = split_namespace(&path) {
                folders.entry(namespace).or_default().push(path);
            }
        }

        let mut report = SweepReport {
            namespaces_checked: folders.len(),
            ..SweepReport::default()
        };

        for (namespace, paths) in folders {
            if self.in_flight.contains(&namespace.path) {
                tracing::debug!(namespace = %namespace.path, "Upload in flight, sweep skipped folder");
                continue;
            }

            // read after the in-flight check so a just finished write is seen
            let projects = self.projects.list_projects_by_owner(&namespace.owner_id).await?;
            if projects.iter().any(|p| namespace.matches(&p.owner_id, &p.title)) {
                continue;
            }

            let referenced: HashSet<String> = projects
                .iter()
                .flat_map(referenced_urls)
                .filter_map(|url| self.blobs.resolve_path(url))
                .collect();
            let orphans: Vec<String> = paths
                .into_iter()
                .filter(|path| !referenced.contains(path))
                .collect();
            if orphans.is_empty() {
                continue;
            }

            let purged = self.delete_all(orphans).await;
            tracing::info!(namespace = %namespace.path, blobs = purged.blobs_deleted, "Purged orphaned project images");

            report.namespaces_purged += 1;
            report.blobs_deleted += purged.blobs_deleted;
            report.blobs_failed += purged.blobs_failed;
        }

        Ok(report)
    }

    async fn delete_all(&self, paths: impl IntoIterator<Item = String>) -> CleanupReport {
        let deletions = paths.into_iter().map(|path| async move {
            let result = self.blobs.delete(&path).await;
            (path, result)
        });

        let mut report = CleanupReport::default();
        for (path, result) in join_all(deletions).await {
            match result {
                Ok(()) => report.blobs_deleted += 1,
                Err(AppError::NotFound(_)) => report.blobs_missing += 1,
                Err(e) => {
                    tracing::warn!(%path, error = %e, "Failed to delete blob");
                    report.blobs_failed += 1;
                }
            }
        }
        report
    }
}

fn referenced_urls(project: &Project) -> impl Iterator<Item = &str> {
    project
        .thumbnail
        .iter()
        .chain(project.screenshots.iter())
        .map(String::as_str)
        .filter(|url| !url.is_empty())
}
