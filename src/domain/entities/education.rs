use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::constants::PRESENT_SENTINEL;

// ───── Document Model ────────────────────────────────────────────────

/// One row of a profile's education history.
///
/// `id` is synthetic and stable for the life of the entry; older documents
/// written without one get a fresh id when they are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EducationEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "School is required"))]
    pub school: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Degree is required"))]
    pub degree: String,

    #[serde(default)]
    pub specialization: String,

    #[serde(default)]
    pub start_year: String,

    /// A year, `"present"`, or empty while the degree is in progress.
    #[serde(default)]
    pub end_year: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationField {
    School,
    Degree,
    Specialization,
    StartYear,
    EndYear,
}

impl EducationEntry {
    pub fn empty() -> Self {
        EducationEntry {
            id: Uuid::new_v4(),
            school: String::new(),
            degree: String::new(),
            specialization: String::new(),
            start_year: String::new(),
            end_year: String::new(),
        }
    }

    pub fn set(&mut self, field: EducationField, value: String) {
        match field {
            EducationField::School => self.school = value,
            EducationField::Degree => self.degree = value,
            EducationField::Specialization => self.specialization = value,
            EducationField::StartYear => self.start_year = value,
            EducationField::EndYear => self.end_year = value,
        }
    }

    /// Entries without both a school and a degree are incomplete.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn is_ongoing(&self) -> bool {
        self.is_ongoing_in(Utc::now().year())
    }

    /// A blank end year or one still to come counts as ongoing, like `present`.
    pub fn is_ongoing_in(&self, current_year: i32) -> bool {
        let end = self.end_year.trim();
        if end.is_empty() || end.eq_ignore_ascii_case(PRESENT_SENTINEL) {
            return true;
        }
        end.parse::<i32>().map_or(false, |year| year > current_year)
    }
}

// ───── Input & Validation ───────────────────────────────────────────

/// An education entry as submitted by the profile form. `id` is echoed back
/// for entries the client already knows about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EducationInput {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(max = 200, message = "School name is too long"))]
    pub school: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "Degree is too long"))]
    pub degree: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "Specialization is too long"))]
    pub specialization: String,

    #[serde(default)]
    #[validate(custom(function = "validate_year"))]
    pub start_year: String,

    #[serde(default)]
    #[validate(custom(function = "validate_end_year"))]
    pub end_year: String,
}

impl EducationInput {
    pub fn into_fields(self) -> [(EducationField, String); 5] {
        [
            (EducationField::School, self.school),
            (EducationField::Degree, self.degree),
            (EducationField::Specialization, self.specialization),
            (EducationField::StartYear, self.start_year),
            (EducationField::EndYear, self.end_year),
        ]
    }
}

// ───── Helper Functions ─────────────────────────────────────────────

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_year(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match value.parse::<u16>() {
        Ok(year) if (1900..=2200).contains(&year) => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_year");
            err.message = Some("Year must be a four digit year".into());
            Err(err)
        }
    }
}

fn validate_end_year(value: &str) -> Result<(), ValidationError> {
    if value.trim().eq_ignore_ascii_case(PRESENT_SENTINEL) {
        return Ok(());
    }
    validate_year(value)
}
