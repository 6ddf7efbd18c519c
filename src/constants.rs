use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Widest image the project editor will upload, in pixels.
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 1000;
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// Root of every project's storage namespace.
pub const PROJECTS_PREFIX: &str = "projects";

pub const PRESENT_SENTINEL: &str = "present";

/// Share of the progress bar taken by the thumbnail upload.
pub const THUMBNAIL_PROGRESS: f32 = 25.0;
pub const SCREENSHOTS_PROGRESS: f32 = 75.0;
