use chrono::{Datelike, Utc};

use crate::{
    entities::portfolio::PortfolioView,
    repositories::{profile::ProfileRepository, project::ProjectRepository},
};

pub struct PortfolioHandler<R, P>
where
    R: ProfileRepository,
    P: ProjectRepository,
{
    pub profile_repo: R,
    pub project_repo: P,
}

impl<R, P> PortfolioHandler<R, P>
where
    R: ProfileRepository,
    P: ProjectRepository,
{
    pub fn new(profile_repo: R, project_repo: P) -> Self {
        PortfolioHandler { profile_repo, project_repo }
    }

    /// The read-only portfolio of `user_id`.
    ///
    /// Never fails: a user without a stored profile, or a store that cannot
    /// be reached, yields `PortfolioView::Pending`.
    pub async fn load_public(&self, user_id: &str) -> PortfolioView {
        let (profile, projects) = tokio::join!(
            self.profile_repo.get_profile(user_id),
            self.project_repo.list_projects_by_owner(user_id),
        );

        let profile = match profile {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::debug!(%user_id, "No profile published yet");
                return PortfolioView::Pending;
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to load public profile");
                return PortfolioView::Pending;
            }
        };

        match projects {
            Ok(projects) => PortfolioView::ready(user_id, profile, projects, Utc::now().year()),
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Failed to load public projects");
                PortfolioView::Pending
            }
        }
    }
}
