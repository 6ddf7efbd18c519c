use actix_web::web;

use crate::handlers::profile;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/profile")
            .route(web::get().to(profile::get_profile))
            .route(web::put().to(profile::save_profile))
            .route(web::delete().to(profile::delete_account))
    );
}
