//! Library API Service
//!
//! HTTP producer for library events. Accepts `POST` and `PUT` requests on
//! `/api/v1/library-event`, tags them `NEW` or `UPDATE`, and publishes
//! them to the partitioned Redis stream keyed by event id.
//!
//! ```text
//! POST /api/v1/library-event ──┐
//! PUT  /api/v1/library-event ──┤
//!                              ▼
//!            Redis Stream (library:events, 3 partitions)
//! ```

use axum::routing::get;
use axum::Router;
use core_config::server::ServerConfig;
use core_config::{app_info, Environment, FromEnv};
use database::redis::RedisConfig;
use domain_library::{handlers, StreamEventPublisher};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Run the library API server.
///
/// # Errors
///
/// Returns an error if the server or Redis configuration is invalid, the
/// Redis connection fails, or the listener cannot bind.
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();

    // Initialize tracing (env-aware: JSON for prod, pretty for dev)
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting library API service");
    info!("Environment: {:?}", environment);

    let server_config = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;
    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;

    // Connect to Redis with retry
    info!("Connecting to Redis...");
    let redis = database::redis::connect_from_config_with_retry(redis_config, None)
        .await
        .wrap_err("Failed to connect to Redis")?;

    let publisher = Arc::new(StreamEventPublisher::new(redis));

    let app = Router::new()
        .nest("/api/v1", handlers::router(publisher))
        .route("/health", get(|| async { "OK" }))
        .route("/healthz", get(|| async { "OK" }));

    let addr = server_config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {}", addr))?;

    info!(address = %addr, "Library API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server failed")?;

    info!("Library API service stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        },
    }
}
