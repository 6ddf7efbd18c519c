pub mod account;
pub mod extractors;
pub mod portfolio;
pub mod profile_editor;
pub mod project_catalog;
pub mod project_cleanup;
pub mod project_editor;
