use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::project::{ProjectSummary, ProjectUpload},
    errors::AppError,
    handlers::profile::ConfirmQuery,
    use_cases::extractors::AuthClaims,
    utils::valid_uuid::valid_uuid,
    AppProjectEditor, AppState,
};

#[instrument(skip(claims, state), fields(user_id = %claims.0.sub))]
pub async fn list_projects(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let projects = state
        .project_catalog
        .list_projects(&claims.into_session())
        .await?;

    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(_claims, state))]
pub async fn get_project(
    _claims: AuthClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;
    let project = state.project_catalog.get_project(&id).await?;

    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(claims, state, form), fields(user_id = %claims.0.sub))]
pub async fn create_project(
    claims: AuthClaims,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ProjectUpload>,
) -> Result<impl Responder, AppError> {
    let mut editor = state.project_editor(claims.into_session());
    editor.load(None).await?;
    stage_upload(&mut editor, form, state.max_upload_bytes).await?;

    let project = editor.submit().await?;
    Ok(HttpResponse::Created().json(ProjectSummary::from(project)))
}

#[instrument(skip(claims, state, form), fields(user_id = %claims.0.sub))]
pub async fn update_project(
    claims: AuthClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ProjectUpload>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;

    let mut editor = state.project_editor(claims.into_session());
    editor.load(Some(id)).await?;
    stage_upload(&mut editor, form, state.max_upload_bytes).await?;

    let project = editor.submit().await?;
    Ok(HttpResponse::Ok().json(ProjectSummary::from(project)))
}

#[instrument(skip(claims, state, query), fields(user_id = %claims.0.sub))]
pub async fn delete_project(
    claims: AuthClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    query: web::Query<ConfirmQuery>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;
    if !query.confirm {
        return Err(AppError::InvalidInput(
            "Project deletion must be confirmed with confirm=true".into(),
        ));
    }

    let report = state
        .project_cleanup
        .delete_project(&claims.into_session(), &id)
        .await?;

    Ok(HttpResponse::Ok().json(report))
}

async fn stage_upload(
    editor: &mut AppProjectEditor,
    form: ProjectUpload,
    max_bytes: usize,
) -> Result<(), AppError> {
    editor.apply_form(form.metadata.into_inner())?;

    if let Some(thumbnail) = form.thumbnail {
        if let Some((name, bytes)) = read_temp_file(thumbnail, max_bytes).await? {
            editor.stage_thumbnail(&name, bytes)?;
        }
    }

    let mut screenshots = Vec::with_capacity(form.screenshots.len());
    for file in form.screenshots {
        if let Some(staged) = read_temp_file(file, max_bytes).await? {
            screenshots.push(staged);
        }
    }
    if !screenshots.is_empty() {
        editor.stage_screenshots(screenshots)?;
    }
    Ok(())
}

/// Reads an uploaded part into memory. Empty parts, sent by browsers for an
/// untouched file input, are skipped.
async fn read_temp_file(file: TempFile, max_bytes: usize) -> Result<Option<(String, Vec<u8>)>, AppError> {
    if file.size == 0 {
        return Ok(None);
    }
    if file.size > max_bytes {
        return Err(AppError::InvalidInput(format!(
            "File exceeds maximum size of {} bytes",
            max_bytes
        )));
    }

    let name = file.file_name.clone().unwrap_or_else(|| "upload".to_string());
    let bytes = tokio::fs::read(file.file.path()).await?;
    Ok(Some((name, bytes)))
}
