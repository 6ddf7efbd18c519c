pub mod blob;
pub mod memory;
pub mod profile;
pub mod project;
pub mod sqlx_repo;
