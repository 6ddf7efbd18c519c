use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::AppState;

#[instrument(skip(state))]
pub async fn get_portfolio(
    user_id: web::Path<String>,
    state: web::Data<AppState>,
) -> impl Responder {
    let view = state.portfolio_handler.load_public(&user_id).await;
    HttpResponse::Ok().json(view)
}
