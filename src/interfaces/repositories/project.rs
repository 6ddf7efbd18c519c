use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::project::{Project, ProjectInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str = "id, owner_id, title, description, technologies, thumbnail, \
    screenshots, project_url, created_at, updated_at";

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError>;

    /// Every project whose `owner_id` equals `owner_id`, newest first
    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, AppError>;

    /// Stores a new project and returns the id the store assigned
    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError>;

    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<(), AppError>;

    /// Removes the document. Returns whether one existed
    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError>;
}

#[async_trait]
impl<T> ProjectRepository for Arc<T>
where
    T: ProjectRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        (**self).get_project(id).await
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, AppError> {
        (**self).list_projects_by_owner(owner_id).await
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        (**self).create_project(project).await
    }

    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<(), AppError> {
        (**self).update_project(id, project).await
    }

    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError> {
        (**self).delete_project(id).await
    }
}

impl SqlxProjectRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn get_project(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn list_projects_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, AppError> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO projects (
                owner_id,
                title,
                description,
                technologies,
                thumbnail,
                screenshots,
                project_url,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
            "#,
        )
        .bind(&project.owner_id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(&project.thumbnail)
        .bind(&project.screenshots)
        .bind(&project.project_url)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET
                title = $2,
                description = $3,
                technologies = $4,
                thumbnail = $5,
                screenshots = $6,
                project_url = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(&project.thumbnail)
        .bind(&project.screenshots)
        .bind(&project.project_url)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project".into()));
        }

        Ok(())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
