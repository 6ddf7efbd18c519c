use actix_web::web;

use crate::handlers::media;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/media/{path:.*}")
            .route(web::get().to(media::get_media))
    );
}
