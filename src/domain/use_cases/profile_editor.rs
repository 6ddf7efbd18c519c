use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        education::{EducationEntry, EducationField, EducationInput},
        profile::{Profile, ProfileField, ProfileForm, SaveOutcome},
        session::Session,
    },
    errors::AppError,
    repositories::profile::ProfileRepository,
    settings::EducationValidation,
};

/// Edits one user's profile.
///
/// The draft lives in memory: every mutation is local and synchronous, and
/// only `load` and `save` reach the repository.
pub struct ProfileEditor<R>
where
    R: ProfileRepository,
{
    repo: R,
    session: Session,
    validation: EducationValidation,
    draft: Profile,
    last_error: Option<String>,
    notice: Option<String>,
}

impl<R> ProfileEditor<R>
where
    R: ProfileRepository,
{
    pub fn new(repo: R, session: Session, validation: EducationValidation) -> Self {
        let draft = Profile::default_for(&session);
        ProfileEditor {
            repo,
            session,
            validation,
            draft,
            last_error: None,
            notice: None,
        }
    }

    pub fn draft(&self) -> &Profile {
        &self.draft
    }

    /// Message for the most recent failed load or save.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Seeds the draft from the stored profile. A user who never saved gets
    /// the default profile.
    pub async fn load(&mut self) -> Result<Profile, AppError> {
        let result = self.fetch().await;
        self.record(result)
    }

    async fn fetch(&mut self) -> Result<Profile, AppError> {
        let user_id = self.session.require_user()?.user_id.clone();

        self.draft = match self.repo.get_profile(&user_id).await? {
            Some(profile) => profile,
            None => {
                tracing::debug!(%user_id, "No stored profile, starting from defaults");
                Profile::default_for(&self.session)
            }
        };

        Ok(self.draft.clone())
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::DisplayName => self.draft.display_name = value,
            ProfileField::Bio => self.draft.bio = value,
            ProfileField::Hobbies => self.draft.hobbies = value,
        }
    }

    /// Appends an empty entry and returns its id.
    pub fn add_education_entry(&mut self) -> Uuid {
        let entry = EducationEntry::empty();
        let id = entry.id;
        self.draft.education.push(entry);
        id
    }

    pub fn remove_education_entry(&mut self, id: Uuid) -> Result<EducationEntry, AppError> {
        let index = self.position(id)?;
        Ok(self.draft.education.remove(index))
    }

    pub fn update_education_entry(
        &mut self,
        id: Uuid,
        field: EducationField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        let index = self.position(id)?;
        self.draft.education[index].set(field, value.into());
        Ok(())
    }

    /// Makes the education list match `entries`, in order. Entries whose id
    /// is already in the draft are updated in place, the others are added,
    /// and draft entries missing from `entries` are removed.
    pub fn replace_education(&mut self, entries: Vec<EducationInput>) -> Result<(), AppError> {
        let mut order = Vec::with_capacity(entries.len());

        for input in entries {
            let known = input
                .id
                .filter(|id| !order.contains(id) && self.position(*id).is_ok());
            let id = match known {
                Some(id) => id,
                None => self.add_education_entry(),
            };

            for (field, value) in input.into_fields() {
                self.update_education_entry(id, field, value)?;
            }
            order.push(id);
        }

        self.draft.education.retain(|entry| order.contains(&entry.id));
        self.draft
            .education
            .sort_by_key(|entry| order.iter().position(|id| *id == entry.id));
        Ok(())
    }

    /// Applies a submitted form to the draft. Absent fields are left alone.
    pub fn apply(&mut self, form: ProfileForm) -> Result<(), AppError> {
        form.validate()?;
        if let Some(entries) = &form.education {
            for entry in entries {
                entry.validate()?;
            }
        }

        if let Some(name) = form.display_name {
            self.set_field(ProfileField::DisplayName, name);
        }
        if let Some(bio) = form.bio {
            self.set_field(ProfileField::Bio, bio);
        }
        if let Some(hobbies) = form.hobbies {
            self.set_field(ProfileField::Hobbies, hobbies);
        }
        if let Some(entries) = form.education {
            self.replace_education(entries)?;
        }
        Ok(())
    }

    /// Writes the draft to the store. The draft itself is never changed, so a
    /// failed save can be retried as is.
    pub async fn save(&mut self) -> Result<SaveOutcome, AppError> {
        let result = self.persist().await;
        match &result {
            Ok(outcome) => self.notice = outcome.notice.clone(),
            Err(_) => self.notice = None,
        }
        self.record(result)
    }

    async fn persist(&self) -> Result<SaveOutcome, AppError> {
        let user_id = &self.session.require_user()?.user_id;

        let mut profile = self.draft.clone();
        let dropped_entries = match self.validation {
            EducationValidation::Strict => {
                let before = profile.education.len();
                profile.education.retain(EducationEntry::is_complete);
                before - profile.education.len()
            }
            EducationValidation::Lenient => 0,
        };

        self.repo.merge_profile(user_id, &profile).await?;

        let notice = (dropped_entries > 0).then(|| incomplete_notice(dropped_entries));
        if dropped_entries > 0 {
            tracing::info!(%user_id, dropped_entries, "Saved profile without incomplete education entries");
        }

        Ok(SaveOutcome {
            profile,
            dropped_entries,
            notice,
        })
    }

    fn position(&self, id: Uuid) -> Result<usize, AppError> {
        self.draft
            .education
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Education entry {id}")))
    }

    fn record<T>(&mut self, result: Result<T, AppError>) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile editor operation failed");
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

fn incomplete_notice(dropped: usize) -> String {
    let noun = if dropped == 1 { "entry was" } else { "entries were" };
    format!("{dropped} education {noun} not saved. School and degree are required.")
}
