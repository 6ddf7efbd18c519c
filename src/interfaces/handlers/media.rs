use actix_web::{
    http::header::{self, CacheControl, CacheDirective},
    web, HttpRequest, HttpResponse, Responder,
};
use tracing::instrument;

use crate::{errors::AppError, storage::paths::decode_path, AppState};

const MEDIA_PREFIX: &str = "/media/";

/// Serves stored images. The content type is sniffed from the bytes.
#[instrument(skip(req, state), fields(path = %req.path()))]
pub async fn get_media(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let raw = req.uri().path().strip_prefix(MEDIA_PREFIX).unwrap_or_default();
    let path = decode_path(raw).ok_or_else(|| AppError::InvalidInput("Invalid media path".into()))?;

    let bytes = state
        .blob_storage
        .get(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("Media".into()))?;

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header(CacheControl(vec![CacheDirective::Public, CacheDirective::MaxAge(300)]))
        .body(bytes))
}
