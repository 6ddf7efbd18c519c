use actix_web::{get, HttpResponse, Responder};
use std::env;

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Portfolio Studio API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "portfolio": "/portfolio/{user_id}",
        "api": "/api/v1"
    }))
}
