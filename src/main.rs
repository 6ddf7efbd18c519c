use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use portfolio_studio::{
    background_task::start_orphan_sweep,
    graceful_shutdown::{shutdown_signal, Shutdown},
    middlewares::auth::AuthMiddleware,
    routes::configure_routes,
    settings::AppConfig,
    telemetry::init_tracing,
    AppState,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::new().context("Configuration error")?;
    init_tracing(&config);
    tracing::info!("Loaded configuration: {:?}", config);

    let app_state = web::Data::new(
        AppState::from_config(&config)
            .await
            .context("Failed to initialise storage")?
    );

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting Portfolio Studio v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let shutdown = Shutdown::new();
    let sweep = tokio::spawn(start_orphan_sweep(
        app_state.project_cleanup.clone(),
        config.sweep_interval(),
        shutdown.subscribe(),
    ));

    let cors_origins = config.cors_origins();
    let max_upload_bytes = config.max_upload_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_upload_bytes * 8)
                    .memory_limit(max_upload_bytes)
            )
            .wrap(AuthMiddleware)
            .wrap(build_cors(&cors_origins))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .disable_signals()
    .run();

    let handle = server.handle();

    tokio::select! {
        res = server => res.context("Server error")?,
        _ = shutdown_signal() => {
            handle.stop(true).await;
        }
    }

    shutdown.trigger();
    if let Err(e) = sweep.await {
        tracing::warn!("Orphan sweep task ended abnormally: {}", e);
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}
