use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod json_error;
mod media;
mod portfolio;
mod profile;
mod projects;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.configure(portfolio::config_routes);
    cfg.configure(media::config_routes);

    cfg.service(
        web::scope("/api/v1")
            .configure(profile::config_routes)
            .configure(projects::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
