pub mod image;
pub mod valid_uuid;
