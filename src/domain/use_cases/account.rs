use serde::Serialize;

use crate::{
    entities::session::Session,
    errors::AppError,
    repositories::{blob::BlobStorage, profile::ProfileRepository, project::ProjectRepository},
    use_cases::project_cleanup::{CleanupReport, ProjectCleanup},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountDeletion {
    pub profile_deleted: bool,
    pub projects_deleted: usize,
    pub projects_failed: usize,
    pub assets: CleanupReport,
}

pub struct AccountHandler<R, P, B>
where
    R: ProfileRepository,
    P: ProjectRepository,
    B: BlobStorage,
{
    pub profile_repo: R,
    pub project_repo: P,
    pub cleanup: ProjectCleanup<P, B>,
}

impl<R, P, B> AccountHandler<R, P, B>
where
    R: ProfileRepository,
    P: ProjectRepository,
    B: BlobStorage,
{
    pub fn new(profile_repo: R, project_repo: P, cleanup: ProjectCleanup<P, B>) -> Self {
        AccountHandler { profile_repo, project_repo, cleanup }
    }

    /// Removes the user's profile and every project they own. Nothing happens
    /// unless `confirm` is set. Partial failures are reported, not rolled back.
    pub async fn delete_account(&self, session: &Session, confirm: bool) -> Result<AccountDeletion, AppError> {
        if !confirm {
            return Err(AppError::InvalidInput(
                "Account deletion must be confirmed with confirm=true".into(),
            ));
        }
        let user_id = session.require_user()?.user_id.clone();

        let profile_deleted = self.profile_repo.delete_profile(&user_id).await?;

        let projects = match self.project_repo.list_projects_by_owner(&user_id).await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Could not list projects for account deletion");
                Vec::new()
            }
        };

        let mut outcome = AccountDeletion {
            profile_deleted,
            ..AccountDeletion::default()
        };

        let results = futures::future::join_all(
            projects.iter().map(|project| self.cleanup.delete_project(session, &project.id)),
        )
        .await;

        for result in results {
            match result {
                Ok(report) => {
                    outcome.projects_deleted += usize::from(report.document_deleted);
                    outcome.assets.absorb(report);
                }
                Err(e) => {
                    tracing::warn!(%user_id, error = %e, "Failed to delete project during account deletion");
                    outcome.projects_failed += 1;
                }
            }
        }

        tracing::info!(
            %user_id,
            profile_deleted,
            projects_deleted = outcome.projects_deleted,
            projects_failed = outcome.projects_failed,
            "Account deleted"
        );
        Ok(outcome)
    }
}
