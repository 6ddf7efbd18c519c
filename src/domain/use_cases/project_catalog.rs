use uuid::Uuid;

use crate::{
    entities::{project::ProjectSummary, session::Session},
    errors::AppError,
    repositories::project::ProjectRepository,
};

pub struct ProjectCatalog<P>
where
    P: ProjectRepository,
{
    pub project_repo: P,
}

impl<P> ProjectCatalog<P>
where
    P: ProjectRepository,
{
    pub fn new(project_repo: P) -> Self {
        ProjectCatalog { project_repo }
    }

    /// Projects owned by the signed-in user, newest first
    pub async fn list_projects(&self, session: &Session) -> Result<Vec<ProjectSummary>, AppError> {
        let user = session.require_user()?;
        let projects = self.project_repo.list_projects_by_owner(&user.user_id).await?;
        Ok(projects.into_iter().map(ProjectSummary::from).collect())
    }

    pub async fn get_project(&self, id: &Uuid) -> Result<ProjectSummary, AppError> {
        self.project_repo
            .get_project(id)
            .await?
            .map(ProjectSummary::from)
            .ok_or_else(|| AppError::NotFound("Project".into()))
    }
}
