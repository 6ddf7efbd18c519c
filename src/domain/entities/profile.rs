use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::Validate;

use crate::entities::{
    education::{EducationEntry, EducationInput},
    session::Session,
};

// ───── Document Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
}

impl Profile {
    /// The profile a user starts from before anything has been saved.
    pub fn default_for(session: &Session) -> Self {
        Profile {
            display_name: session
                .user()
                .and_then(|u| u.display_name.clone())
                .unwrap_or_default(),
            ..Profile::default()
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub display_name: String,
    pub bio: String,
    pub hobbies: String,
    pub education: Json<Vec<EducationEntry>>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            display_name: row.display_name,
            bio: row.bio,
            hobbies: row.hobbies,
            education: row.education.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    DisplayName,
    Bio,
    Hobbies,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub profile: Profile,
    pub dropped_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

// ───── Input & Validation ───────────────────────────────────────────

/// Profile edits submitted by the client. Absent fields keep their draft value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(max = 120, message = "Display name is too long"))]
    pub display_name: Option<String>,

    #[validate(length(max = 2000, message = "Bio is too long"))]
    pub bio: Option<String>,

    #[validate(length(max = 500, message = "Hobbies is too long"))]
    pub hobbies: Option<String>,

    pub education: Option<Vec<EducationInput>>,
}
