pub mod asset;
pub mod education;
pub mod portfolio;
pub mod profile;
pub mod project;
pub mod session;
pub mod token;
