
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use portfolio_studio::{
    entities::{
        education::{EducationField, EducationInput},
        profile::{Profile, ProfileField, ProfileForm},
        session::Session,
    },
    errors::AppError,
    repositories::{memory::InMemoryProfileRepo, profile::ProfileRepository},
    settings::EducationValidation,
    use_cases::profile_editor::ProfileEditor,
};
use test_utils::*;

mock! {
    pub Profiles {}

    #[async_trait]
    impl ProfileRepository for Profiles {
        async fn check_connection(&self) -> Result<(), AppError>;
        async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError>;
        async fn merge_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError>;
        async fn delete_profile(&self, user_id: &str) -> Result<bool, AppError>;
    }
}

fn editor(repo: Arc<InMemoryProfileRepo>, validation: EducationValidation) -> ProfileEditor<Arc<InMemoryProfileRepo>> {
    ProfileEditor::new(repo, session("user-1"), validation)
}

fn entry(school: &str, degree: &str) -> EducationInput {
    EducationInput {
        school: school.to_string(),
        degree: degree.to_string(),
        ..EducationInput::default()
    }
}

#[actix_rt::test]
async fn load_without_document_yields_default_profile() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo, EducationValidation::Strict);

    let profile = editor.load().await.expect("load should not fail");

    assert_eq!(profile, Profile::default_for(&session("user-1")));
    assert_eq!(profile.display_name, "Test User");
    assert!(profile.education.is_empty());
    assert!(editor.last_error().is_none());
}

#[actix_rt::test]
async fn load_without_session_is_unauthorized() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = ProfileEditor::new(repo, Session::anonymous(), EducationValidation::Strict);

    let result = editor.load().await;

    assert!(matches!(result, Err(AppError::UnauthorizedAccess)));
    assert!(editor.last_error().is_some());
}

#[actix_rt::test]
async fn load_seeds_the_draft_from_the_stored_profile() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let stored = Profile {
        display_name: "Ada".into(),
        bio: "Engineer".into(),
        ..Profile::default()
    };
    repo.merge_profile("user-1", &stored).await.unwrap();

    let mut editor = editor(repo, EducationValidation::Strict);
    editor.load().await.unwrap();

    assert_eq!(editor.draft(), &stored);
}

#[actix_rt::test]
async fn adding_then_removing_an_entry_restores_the_sequence() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo, EducationValidation::Strict);
    editor.apply(ProfileForm {
        education: Some(vec![entry("MIT", "BSc"), entry("ETH", "MSc")]),
        ..ProfileForm::default()
    })
    .unwrap();
    let before = editor.draft().education.clone();

    let id = editor.add_education_entry();
    assert_eq!(editor.draft().education.len(), 3);
    editor.remove_education_entry(id).unwrap();

    assert_eq!(editor.draft().education, before);
}

#[actix_rt::test]
async fn removing_an_unknown_entry_is_not_found() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo, EducationValidation::Strict);

    let result = editor.remove_education_entry(uuid::Uuid::new_v4());
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn strict_save_drops_incomplete_entries() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo.clone(), EducationValidation::Strict);

    let first = editor.add_education_entry();
    editor.update_education_entry(first, EducationField::School, "A").unwrap();
    editor.update_education_entry(first, EducationField::Degree, "B").unwrap();
    let second = editor.add_education_entry();
    editor.update_education_entry(second, EducationField::Degree, "C").unwrap();

    let outcome = editor.save().await.expect("save should succeed");

    assert_eq!(outcome.dropped_entries, 1);
    assert!(outcome.notice.is_some());
    assert_eq!(editor.notice(), outcome.notice.as_deref());

    let stored = repo.get_profile("user-1").await.unwrap().unwrap();
    assert_eq!(stored.education.len(), 1);
    assert_eq!(stored.education[0].id, first);
    assert_eq!(stored.education[0].school, "A");

    // the draft keeps the incomplete entry for the user to fix
    assert_eq!(editor.draft().education.len(), 2);
}

#[actix_rt::test]
async fn lenient_save_keeps_incomplete_entries() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo.clone(), EducationValidation::Lenient);
    editor.apply(ProfileForm {
        education: Some(vec![entry("A", "B"), entry("", "C")]),
        ..ProfileForm::default()
    })
    .unwrap();

    let outcome = editor.save().await.unwrap();

    assert_eq!(outcome.dropped_entries, 0);
    assert!(outcome.notice.is_none());
    assert_eq!(repo.get_profile("user-1").await.unwrap().unwrap().education.len(), 2);
}

#[actix_rt::test]
async fn save_writes_the_edited_fields() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo.clone(), EducationValidation::Strict);
    editor.load().await.unwrap();

    editor.set_field(ProfileField::Bio, "Builds things");
    editor.set_field(ProfileField::Hobbies, "Climbing");
    editor.save().await.unwrap();

    let stored = repo.get_profile("user-1").await.unwrap().unwrap();
    assert_eq!(stored.bio, "Builds things");
    assert_eq!(stored.hobbies, "Climbing");
    assert_eq!(stored.display_name, "Test User");
}

#[actix_rt::test]
async fn failed_save_keeps_the_draft_and_records_the_error() {
    let mut repo = MockProfiles::new();
    repo.expect_merge_profile()
        .times(1)
        .returning(|_, _| Err(AppError::StorageError("unavailable".into())));

    let mut editor = ProfileEditor::new(repo, session("user-1"), EducationValidation::Strict);
    editor.set_field(ProfileField::Bio, "Unsaved bio");

    let result = editor.save().await;

    assert!(matches!(result, Err(AppError::StorageError(_))));
    assert_eq!(editor.last_error(), Some("Failed to save changes. Please try again."));
    assert_eq!(editor.draft().bio, "Unsaved bio");
}

#[actix_rt::test]
async fn replace_education_keeps_ids_the_client_echoes() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo, EducationValidation::Strict);
    editor.apply(ProfileForm {
        education: Some(vec![entry("MIT", "BSc"), entry("ETH", "MSc")]),
        ..ProfileForm::default()
    })
    .unwrap();
    let eth_id = editor.draft().education[1].id;

    let mut edited = entry("ETH Zurich", "MSc");
    edited.id = Some(eth_id);
    editor.replace_education(vec![edited, entry("EPFL", "PhD")]).unwrap();

    let education = &editor.draft().education;
    assert_eq!(education.len(), 2);
    assert_eq!(education[0].id, eth_id);
    assert_eq!(education[0].school, "ETH Zurich");
    assert_eq!(education[1].school, "EPFL");
}

#[actix_rt::test]
async fn apply_rejects_malformed_years() {
    let repo = Arc::new(InMemoryProfileRepo::new());
    let mut editor = editor(repo, EducationValidation::Strict);

    let mut bad = entry("MIT", "BSc");
    bad.start_year = "last year".into();
    let result = editor.apply(ProfileForm {
        education: Some(vec![bad]),
        ..ProfileForm::default()
    });

    assert!(matches!(result, Err(AppError::ValidationError(_))));
    assert!(editor.draft().education.is_empty());
}
