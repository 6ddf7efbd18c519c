use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, storage, utils};

use auth::jwt::JwtService;
use entities::session::Session;
use errors::AppError;
use repositories::{
    blob::BlobStorage,
    memory::{InMemoryProfileRepo, InMemoryProjectRepo},
    profile::ProfileRepository,
    project::ProjectRepository,
    sqlx_repo::{SqlxProfileRepo, SqlxProjectRepo},
};
use settings::{AppConfig, EducationValidation};
use storage::{in_flight::InFlightUploads, local::LocalBlobStorage, memory::InMemoryBlobStorage};
use use_cases::{
    account::AccountHandler,
    portfolio::PortfolioHandler,
    profile_editor::ProfileEditor,
    project_catalog::ProjectCatalog,
    project_cleanup::ProjectCleanup,
    project_editor::ProjectEditor,
};
use utils::image::ImageSettings;

pub type DynProfileRepo = Arc<dyn ProfileRepository>;
pub type DynProjectRepo = Arc<dyn ProjectRepository>;
pub type DynBlobStorage = Arc<dyn BlobStorage>;

pub type AppProfileEditor = ProfileEditor<DynProfileRepo>;
pub type AppProjectEditor = ProjectEditor<DynProjectRepo, DynBlobStorage>;
pub type AppProjectCleanup = ProjectCleanup<DynProjectRepo, DynBlobStorage>;
pub type AppPortfolioHandler = PortfolioHandler<DynProfileRepo, DynProjectRepo>;
pub type AppAccountHandler = AccountHandler<DynProfileRepo, DynProjectRepo, DynBlobStorage>;
pub type AppProjectCatalog = ProjectCatalog<DynProjectRepo>;

pub struct AppState {
    pub profile_repo: DynProfileRepo,
    pub project_repo: DynProjectRepo,
    pub blob_storage: DynBlobStorage,
    pub token_service: JwtService,
    pub image_settings: ImageSettings,
    pub education_validation: EducationValidation,
    pub max_upload_bytes: usize,
    pub in_flight: InFlightUploads,
    pub portfolio_handler: AppPortfolioHandler,
    pub project_cleanup: AppProjectCleanup,
    pub account_handler: AppAccountHandler,
    pub project_catalog: AppProjectCatalog,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        profile_repo: DynProfileRepo,
        project_repo: DynProjectRepo,
        blob_storage: DynBlobStorage,
    ) -> Self {
        let in_flight = InFlightUploads::new();
        let project_cleanup = ProjectCleanup::new(project_repo.clone(), blob_storage.clone())
            .tracking(in_flight.clone());

        AppState {
            token_service: JwtService::new(config),
            image_settings: ImageSettings::from(config),
            education_validation: config.education_validation,
            max_upload_bytes: config.max_upload_bytes,
            portfolio_handler: PortfolioHandler::new(profile_repo.clone(), project_repo.clone()),
            account_handler: AccountHandler::new(
                profile_repo.clone(),
                project_repo.clone(),
                project_cleanup.clone(),
            ),
            project_catalog: ProjectCatalog::new(project_repo.clone()),
            project_cleanup,
            in_flight,
            profile_repo,
            project_repo,
            blob_storage,
        }
    }

    /// Postgres when a database URL is configured, memory otherwise. Images
    /// always go to the local media folder.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let blob_storage: DynBlobStorage = Arc::new(LocalBlobStorage::new(
            config.media_root.clone(),
            &config.media_base_url,
        )?);
        blob_storage.check_connection().await?;

        let state = match &config.database_url {
            Some(url) => {
                let pool = db::postgres::create_pool(url).await?;
                db::postgres::run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::InternalError(format!("Migration failed: {e}")))?;

                AppState::new(
                    config,
                    Arc::new(SqlxProfileRepo::new(pool.clone())),
                    Arc::new(SqlxProjectRepo::new(pool)),
                    blob_storage,
                )
            }
            None => {
                tracing::warn!("No database configured, documents are kept in memory only");
                AppState::new(
                    config,
                    Arc::new(InMemoryProfileRepo::new()),
                    Arc::new(InMemoryProjectRepo::new()),
                    blob_storage,
                )
            }
        };

        Ok(state)
    }

    /// Everything in memory. Used by tests.
    pub fn in_memory(config: &AppConfig) -> Result<Self, AppError> {
        Ok(AppState::new(
            config,
            Arc::new(InMemoryProfileRepo::new()),
            Arc::new(InMemoryProjectRepo::new()),
            Arc::new(InMemoryBlobStorage::new(&config.media_base_url)?),
        ))
    }

    pub fn profile_editor(&self, session: Session) -> AppProfileEditor {
        ProfileEditor::new(self.profile_repo.clone(), session, self.education_validation)
    }

    pub fn project_editor(&self, session: Session) -> AppProjectEditor {
        ProjectEditor::new(
            self.project_repo.clone(),
            self.blob_storage.clone(),
            session,
            self.image_settings,
        )
        .tracking(self.in_flight.clone())
    }
}
