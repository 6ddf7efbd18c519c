
use std::sync::Arc;

use portfolio_studio::{
    entities::profile::Profile,
    errors::AppError,
    repositories::{
        blob::{BlobMetadata, BlobStorage},
        memory::InMemoryProjectRepo,
        profile::ProfileRepository,
        project::ProjectRepository,
    },
    storage::{in_flight::InFlightUploads, memory::InMemoryBlobStorage, paths::project_namespace},
    use_cases::{
        project_cleanup::{CleanupReport, ProjectCleanup},
        project_editor::ProjectEditor,
    },
    utils::image::ImageSettings,
};
use test_utils::*;

async fn seed_blob(blobs: &InMemoryBlobStorage, path: &str) -> String {
    blobs
        .upload(path, png_bytes(2, 2), BlobMetadata::new("image/jpeg"))
        .await
        .unwrap();
    blobs.download_url(path).await.unwrap()
}

fn cleanup(ctx: &TestContext) -> ProjectCleanup<Arc<InMemoryProjectRepo>, Arc<InMemoryBlobStorage>> {
    ProjectCleanup::new(ctx.projects.clone(), ctx.blobs.clone())
}

#[actix_rt::test]
async fn missing_blobs_do_not_block_deletion() {
    let ctx = TestContext::new();
    let namespace = project_namespace("user-1", "Site");
    let stored = seed_blob(&ctx.blobs, &format!("{namespace}/screenshot_1")).await;
    let never_uploaded = media_url(&format!("{namespace}/screenshot_2"));

    let id = ctx
        .projects
        .create_project(&project_insert(
            "user-1",
            "Site",
            Some(media_url(&format!("{namespace}/thumbnail"))),
            vec![stored, never_uploaded],
        ))
        .await
        .unwrap();

    let report = cleanup(&ctx)
        .delete_project(&session("user-1"), &id)
        .await
        .expect("deletion should succeed");

    assert_eq!(
        report,
        CleanupReport {
            document_deleted: true,
            blobs_deleted: 1,
            blobs_missing: 2,
            blobs_failed: 0,
        }
    );
    assert!(ctx.projects.get_project(&id).await.unwrap().is_none());
    assert!(ctx.blobs.is_empty());
}

#[actix_rt::test]
async fn deleting_twice_is_harmless() {
    let ctx = TestContext::new();
    let id = ctx.insert_project("user-1", "Site", Vec::new()).await;
    let cleanup = cleanup(&ctx);

    let first = cleanup.delete_project(&session("user-1"), &id).await.unwrap();
    let second = cleanup.delete_project(&session("user-1"), &id).await.unwrap();

    assert!(first.document_deleted);
    assert_eq!(second, CleanupReport::default());
}

#[actix_rt::test]
async fn only_the_owner_can_delete() {
    let ctx = TestContext::new();
    let namespace = project_namespace("owner", "Site");
    let url = seed_blob(&ctx.blobs, &format!("{namespace}/thumbnail")).await;
    let id = ctx.insert_project("owner", "Site", vec![url]).await;

    let result = cleanup(&ctx).delete_project(&session("intruder"), &id).await;

    assert!(matches!(result, Err(AppError::ForbiddenAccess)));
    assert!(ctx.projects.get_project(&id).await.unwrap().is_some());
    assert_eq!(ctx.blobs.len(), 1);
}

#[actix_rt::test]
async fn unreferenced_files_in_the_folder_are_removed() {
    let ctx = TestContext::new();
    let namespace = project_namespace("user-1", "Site");
    let live = seed_blob(&ctx.blobs, &format!("{namespace}/screenshot_live")).await;
    seed_blob(&ctx.blobs, &format!("{namespace}/screenshot_stale")).await;
    // uploaded under the project's previous title
    let old = seed_blob(&ctx.blobs, &format!("{}/thumbnail", project_namespace("user-1", "Old Name"))).await;

    let id = ctx
        .projects
        .create_project(&project_insert("user-1", "Site", Some(old), vec![live]))
        .await
        .unwrap();

    let report = cleanup(&ctx).delete_project(&session("user-1"), &id).await.unwrap();

    assert_eq!(report.blobs_deleted, 3);
    assert!(ctx.blobs.is_empty());
}

#[actix_rt::test]
async fn images_of_a_sibling_in_the_same_folder_survive() {
    let ctx = TestContext::new();
    let namespace = project_namespace("user-1", "Site");
    let mine = seed_blob(&ctx.blobs, &format!("{namespace}/screenshot_mine")).await;
    let theirs = seed_blob(&ctx.blobs, &format!("{namespace}/screenshot_theirs")).await;

    let id = ctx.insert_project("user-1", "Site", vec![mine.clone()]).await;
    ctx.insert_project("user-1", "site", vec![theirs.clone()]).await;

    let report = cleanup(&ctx).delete_project(&session("user-1"), &id).await.unwrap();

    assert_eq!(report.blobs_deleted, 1);
    assert!(ctx.blobs.get(&mine).await.unwrap().is_none());
    assert!(ctx.blobs.get(&theirs).await.unwrap().is_some());
}

#[actix_rt::test]
async fn blob_failures_are_reported_not_raised() {
    let ctx = TestContext::new();
    let mut blobs = MockBlobs::new();
    blobs
        .expect_resolve_path()
        .returning(|path| Some(path.to_string()));
    blobs.expect_list().returning(|_| Ok(Vec::new()));
    blobs
        .expect_delete()
        .times(2)
        .returning(|_| Err(AppError::StorageError("permission denied".into())));

    let id = ctx
        .insert_project(
            "user-1",
            "Site",
            vec!["projects/user-1/site/a".into(), "projects/user-1/site/b".into()],
        )
        .await;

    let report = ProjectCleanup::new(ctx.projects.clone(), blobs)
        .delete_project(&session("user-1"), &id)
        .await
        .expect("blob failures should not fail the deletion");

    assert!(report.document_deleted);
    assert_eq!(report.blobs_failed, 2);
    assert!(ctx.projects.is_empty());
}

#[actix_rt::test]
async fn sweep_purges_folders_no_project_points_to() {
    let ctx = TestContext::new();
    let live = project_namespace("user-1", "Site");
    let renamed = project_namespace("user-1", "Old Name");
    let abandoned = project_namespace("user-2", "Gone");

    let url = seed_blob(&ctx.blobs, &format!("{live}/thumbnail")).await;
    seed_blob(&ctx.blobs, &format!("{renamed}/thumbnail")).await;
    seed_blob(&ctx.blobs, &format!("{renamed}/screenshot_1")).await;
    seed_blob(&ctx.blobs, &format!("{abandoned}/thumbnail")).await;
    ctx.insert_project("user-1", "Site", vec![url.clone()]).await;

    let report = cleanup(&ctx).sweep_orphans().await.unwrap();

    assert_eq!(report.namespaces_checked, 3);
    assert_eq!(report.namespaces_purged, 2);
    assert_eq!(report.blobs_deleted, 3);
    assert_eq!(report.blobs_failed, 0);
    assert_eq!(ctx.blobs.len(), 1);
    assert!(ctx.blobs.get(&url).await.unwrap().is_some());
}

#[actix_rt::test]
async fn sweep_keeps_images_a_renamed_project_still_uses() {
    let ctx = TestContext::new();
    let mut editor = ProjectEditor::new(
        ctx.projects.clone(),
        ctx.blobs.clone(),
        session("user-1"),
        ImageSettings::default(),
    );
    editor.set_title("Old Name");
    editor.stage_thumbnail("cover.png", png_bytes(8, 8)).unwrap();
    editor
        .stage_screenshots(vec![("one.png".into(), png_bytes(8, 8))])
        .unwrap();
    let created = editor.submit().await.unwrap();

    editor.load(Some(created.id)).await.unwrap();
    editor.set_title("New Name");
    let renamed = editor.submit().await.unwrap();

    let old_folder = project_namespace("user-1", "Old Name");
    let stale = seed_blob(&ctx.blobs, &format!("{old_folder}/screenshot_stale")).await;

    let report = cleanup(&ctx).sweep_orphans().await.unwrap();

    assert_eq!(report.namespaces_checked, 1);
    assert_eq!(report.namespaces_purged, 1);
    assert_eq!(report.blobs_deleted, 1);
    assert!(ctx.blobs.get(&stale).await.unwrap().is_none());
    for url in renamed.screenshots.iter().chain(renamed.thumbnail.iter()) {
        assert!(ctx.blobs.get(url).await.unwrap().is_some(), "{url} was swept");
    }
}

#[actix_rt::test]
async fn sweep_skips_folders_with_uploads_in_flight() {
    let ctx = TestContext::new();
    let uploads = InFlightUploads::new();
    let cleanup = cleanup(&ctx).tracking(uploads.clone());

    let folder = project_namespace("user-1", "Being Created");
    let url = seed_blob(&ctx.blobs, &format!("{folder}/screenshot_1")).await;

    let uploading = uploads.begin(&folder);
    let report = cleanup.sweep_orphans().await.unwrap();
    assert_eq!(report.namespaces_purged, 0);
    assert!(ctx.blobs.get(&url).await.unwrap().is_some());

    std::mem::drop(uploading);
    let report = cleanup.sweep_orphans().await.unwrap();
    assert_eq!(report.namespaces_purged, 1);
    assert!(ctx.blobs.is_empty());
}

#[actix_rt::test]
async fn account_deletion_needs_confirmation() {
    let ctx = TestContext::new();
    ctx.profiles.merge_profile("user-1", &Profile::default()).await.unwrap();
    ctx.insert_project("user-1", "Site", Vec::new()).await;

    let result = ctx
        .state
        .account_handler
        .delete_account(&session("user-1"), false)
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
    assert!(ctx.profiles.get_profile("user-1").await.unwrap().is_some());
    assert_eq!(ctx.projects.len(), 1);
}

#[actix_rt::test]
async fn account_deletion_removes_profile_projects_and_images() {
    let ctx = TestContext::new();
    ctx.profiles.merge_profile("user-1", &Profile::default()).await.unwrap();

    let first = seed_blob(&ctx.blobs, &format!("{}/thumbnail", project_namespace("user-1", "One"))).await;
    let second = seed_blob(&ctx.blobs, &format!("{}/thumbnail", project_namespace("user-1", "Two"))).await;
    let other = seed_blob(&ctx.blobs, &format!("{}/thumbnail", project_namespace("user-2", "Mine"))).await;
    ctx.insert_project("user-1", "One", vec![first]).await;
    ctx.insert_project("user-1", "Two", vec![second]).await;
    let kept = ctx.insert_project("user-2", "Mine", vec![other.clone()]).await;

    let outcome = ctx
        .state
        .account_handler
        .delete_account(&session("user-1"), true)
        .await
        .unwrap();

    assert!(outcome.profile_deleted);
    assert_eq!(outcome.projects_deleted, 2);
    assert_eq!(outcome.projects_failed, 0);
    assert_eq!(outcome.assets.blobs_deleted, 2);

    assert!(ctx.profiles.get_profile("user-1").await.unwrap().is_none());
    assert_eq!(ctx.projects.len(), 1);
    assert!(ctx.projects.get_project(&kept).await.unwrap().is_some());
    assert!(ctx.blobs.get(&other).await.unwrap().is_some());
}
