use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::profile::ProfileForm,
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

/// `?confirm=true` guard for destructive endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[instrument(skip(claims, state), fields(user_id = %claims.0.sub))]
pub async fn get_profile(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let mut editor = state.profile_editor(claims.into_session());
    let profile = editor.load().await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(claims, state, data), fields(user_id = %claims.0.sub))]
pub async fn save_profile(
    claims: AuthClaims,
    state: web::Data<AppState>,
    data: web::Json<ProfileForm>,
) -> Result<impl Responder, AppError> {
    let mut editor = state.profile_editor(claims.into_session());
    editor.load().await?;
    editor.apply(data.into_inner())?;

    let outcome = editor.save().await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(skip(claims, state, query), fields(user_id = %claims.0.sub))]
pub async fn delete_account(
    claims: AuthClaims,
    state: web::Data<AppState>,
    query: web::Query<ConfirmQuery>,
) -> Result<impl Responder, AppError> {
    let session = claims.into_session();
    let outcome = state
        .account_handler
        .delete_account(&session, query.confirm)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}
