//! # MentorHub API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use api_server::config::AppConfig;
use api_server::handlers;
use api_server::observability::RequestIdMiddleware;
use api_server::state::AppState;
use api_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().context("invalid configuration")?;

    tracing::info!(
        "Starting MentorHub API Server on {}:{}",
        config.host,
        config.port
    );

    let state = web::Data::new(
        AppState::from_config(&config)
            .await
            .context("failed to initialize application state")?,
    );

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("server error")
}
