use std::sync::Arc;

use async_trait::async_trait;
use sqlx::types::Json;

use crate::{
    entities::profile::{Profile, ProfileRow},
    errors::AppError,
    repositories::sqlx_repo::SqlxProfileRepo,
};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;

    /// Fetches the profile document keyed by `user_id`, if one was ever saved
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError>;

    /// Writes the profile fields over the stored document, creating it when absent
    async fn merge_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError>;

    /// Removes the document. Returns whether one existed
    async fn delete_profile(&self, user_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
impl<T> ProfileRepository for Arc<T>
where
    T: ProfileRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        (**self).get_profile(user_id).await
    }

    async fn merge_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError> {
        (**self).merge_profile(user_id, profile).await
    }

    async fn delete_profile(&self, user_id: &str) -> Result<bool, AppError> {
        (**self).delete_profile(user_id).await
    }
}

impl SqlxProfileRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProfileRepo { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, display_name, bio, hobbies, education, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn merge_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, bio, hobbies, education, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET
                display_name = EXCLUDED.display_name,
                bio = EXCLUDED.bio,
                hobbies = EXCLUDED.hobbies,
                education = EXCLUDED.education,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(&profile.hobbies)
        .bind(Json(&profile.education))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_profile(&self, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
