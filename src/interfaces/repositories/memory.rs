use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    entities::{
        profile::Profile,
        project::{Project, ProjectInsert},
    },
    errors::AppError,
    repositories::{profile::ProfileRepository, project::ProjectRepository},
};

/// Profile documents kept in process memory. Used by tests and when no
/// database is configured.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepo {
    profiles: DashMap<String, Profile>,
}

impl InMemoryProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }

    async fn merge_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError> {
        let mut entry = self.profiles.entry(user_id.to_string()).or_default();
        let stored = entry.value_mut();
        stored.display_name = profile.display_name.clone();
        stored.bio = profile.bio.clone();
        stored.hobbies = profile.hobbies.clone();
        stored.education = profile.education.clone();
        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.profiles.remove(user_id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProjectRepo {
    projects: DashMap<Uuid, Project>,
}

impl InMemoryProjectRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.projects.get(id).map(|p| p.value().clone()))
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, AppError> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .map(|p| p.value().clone())
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let created = project.clone().into_project(id, project.updated_at);
        self.projects.insert(id, created);
        Ok(id)
    }

    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<(), AppError> {
        let mut stored = self
            .projects
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Project".into()))?;

        let created_at = stored.created_at;
        *stored = project.clone().into_project(*id, created_at);
        Ok(())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError> {
        Ok(self.projects.remove(id).is_some())
    }
}
