//! Library Worker Service
//!
//! A background worker that consumes library events from a Redis stream
//! and persists them to PostgreSQL.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (library:events, 3 partitions)
//!   ↓ (Consumer Group: library_workers)
//! StreamWorker<LibraryEventProcessor>
//!   ↓ (bounded retry, fixed backoff)
//! LibraryEventService<PgLibraryEventRepository>
//!   ↓
//! PostgreSQL Database
//!
//! exhausted retryable events ──► Redis Stream (library:events:recovery)
//! ```
//!
//! ## Features
//!
//! - One sequential consumer per partition, preserving per-key ordering
//! - Bounded in-place retry with recovery dispatch on exhaustion
//! - Graceful shutdown handling
//! - Health check and metrics endpoints for Kubernetes probes

use core_config::{app_info, Environment, FromEnv};
use database::postgres::{connect_from_config_with_retry, run_migrations, PostgresConfig};
use database::redis::RedisConfig;
use domain_library::{
    LibraryEventProcessor, LibraryEventService, LibraryEventStream, PgLibraryEventRepository,
};
use eyre::{Result, WrapErr};
use stream_worker::{health_router, HealthState, StreamWorker, WorkerConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Start the health HTTP server.
///
/// Provides endpoints for:
/// - Liveness probes: `/health`, `/healthz`
/// - Readiness probes: `/ready`, `/readyz`
/// - Prometheus metrics: `/metrics`
async fn start_health_server(health_state: HealthState, port: u16) -> Result<()> {
    let app = health_router(health_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind health server to {}", addr))?;

    info!(port = %port, "Health server listening");

    axum::serve(listener, app)
        .await
        .wrap_err("Health server failed")?;

    Ok(())
}

/// Run the library worker.
///
/// # Errors
///
/// Returns an error if:
/// - PostgreSQL configuration is invalid or the connection fails
/// - Redis configuration is invalid or the connection fails
/// - Migrations fail
/// - The worker encounters a fatal error
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();

    // Initialize tracing (env-aware: JSON for prod, pretty for dev)
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    // Initialize Prometheus metrics
    stream_worker::metrics::init_metrics();

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting library worker service");
    info!("Environment: {:?}", environment);

    // Health server port (default 8082)
    let health_port: u16 = std::env::var("HEALTH_PORT")
        .unwrap_or_else(|_| "8082".to_string())
        .parse()
        .unwrap_or(8082);

    // Connect to PostgreSQL with retry and bring the schema up to date
    let pg_config =
        PostgresConfig::from_env().wrap_err("Failed to load PostgreSQL configuration")?;
    info!("Connecting to PostgreSQL...");
    let db = connect_from_config_with_retry(pg_config, None)
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    run_migrations::<migration::Migrator>(&db, app_info.name)
        .await
        .wrap_err("Failed to run migrations")?;

    // Connect to Redis with retry
    let redis_config = RedisConfig::from_env().wrap_err("Failed to load Redis configuration")?;
    info!("Connecting to Redis...");
    let redis = database::redis::connect_from_config_with_retry(redis_config, None)
        .await
        .wrap_err("Failed to connect to Redis")?;

    let worker_config = WorkerConfig::from_stream_def::<LibraryEventStream>();

    // Simulated store outage for exercising retry and recovery end to end.
    // Events with this id fail transiently in the worker (default 0).
    let simulated_outage_id: i32 = std::env::var("SIMULATED_OUTAGE_ID")
        .unwrap_or_else(|_| "0".to_string())
        .parse()
        .wrap_err("SIMULATED_OUTAGE_ID must be an integer")?;
    info!(simulated_outage_id, "Simulated store outage enabled");

    let repository = PgLibraryEventRepository::new(db);
    let service =
        LibraryEventService::new(repository).with_simulated_outage(simulated_outage_id);
    let processor = LibraryEventProcessor::new(service);

    // Shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Error waiting for shutdown signal: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    // Health server in the background
    let health_state = HealthState::new(
        redis.clone(),
        app_info.name,
        app_info.version,
        worker_config.stream_name.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state, health_port).await {
            error!(error = %e, "Health server failed");
        }
    });

    info!("Starting library event processor...");
    let worker = StreamWorker::new(redis, processor, worker_config);
    worker
        .run(shutdown_rx)
        .await
        .map_err(|e| eyre::eyre!("{}", e))?;

    info!("Library worker service stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() -> Result<()> {
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

    Ok(())
}
