pub mod home;
pub mod json_error;
pub mod media;
pub mod portfolio;
pub mod profile;
pub mod projects;
pub mod system;
