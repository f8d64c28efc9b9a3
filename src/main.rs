//! nc server: number pool rotation engine.
//!
//! Main entry point that wires all crates together and starts the HTTP
//! API, the rotation scheduler, and the cron jobs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use nc_client::{VendorControlClient, WebitelClient};
use nc_core::config::{AppConfig, ConfigHandle, ConfigSource};
use nc_core::error::AppError;
use nc_database::DatabasePool;
use nc_service::Services;
use nc_worker::{CronScheduler, RotationScheduler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.current().as_ref());

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `NC_CONFIG` (a single file) or from
/// `config/default.toml` + `config/{NC_ENV}.toml`, both overlaid with
/// `NC__*` environment variables.
fn load_configuration() -> Result<ConfigHandle, AppError> {
    if let Ok(path) = std::env::var("NC_CONFIG") {
        let config = AppConfig::load_file(&path)?;
        return Ok(ConfigHandle::new(config, ConfigSource::File(path)));
    }

    let env = std::env::var("NC_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env)?;
    Ok(ConfigHandle::new(config, ConfigSource::Environment(env)))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(handle: ConfigHandle) -> Result<(), AppError> {
    let config = handle.current();
    tracing::info!("Starting nc v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    nc_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: External clients ─────────────────────────────────
    let pusher = Arc::new(WebitelClient::new(&config.webitel)?);
    let control = Arc::new(VendorControlClient::new(&config.vendor_control)?);
    tracing::info!(
        webitel = %config.webitel.base_url,
        vendor_control = %config.vendor_control.base_url,
        "External clients initialized"
    );

    // ── Step 3: Engine services ──────────────────────────────────
    let services = Services::new(Arc::new(db.store()), pusher, control);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Rotation scheduler (windows + dispatch) ──────────
    let scheduler = RotationScheduler::new(
        Arc::clone(&services.store),
        services.rotation.clone(),
        handle.clone(),
    );
    let scheduler_handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let shutdown_rx = shutdown_rx.clone();
        async move { scheduler.run(shutdown_rx).await }
    });
    tracing::info!(
        timezone = %config.rotation.timezone,
        enabled = config.rotation.enabled,
        "Rotation scheduler spawned"
    );

    // ── Step 5: Cron jobs (activation cycle, actuality sync) ─────
    let mut cron = CronScheduler::new(
        services.activator.clone(),
        services.actuality.clone(),
        handle.clone(),
    )
    .await?;
    cron.register_default_tasks().await?;
    cron.start().await?;

    // ── Step 6: Build and start HTTP server ──────────────────────
    let state = nc_api::AppState::new(services, handle.clone())
        .with_runs(scheduler.registry().clone());
    let app = nc_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("nc server listening on {}", addr);

    // ── Step 7: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 8: Stop background work ─────────────────────────────
    tracing::info!("Waiting for background tasks to complete...");
    if let Err(e) = cron.shutdown().await {
        tracing::warn!(error = %e, "Cron scheduler did not shut down cleanly");
    }

    let grace = Duration::from_secs(handle.current().server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, scheduler_handle).await.is_err() {
        tracing::warn!("Rotation scheduler did not stop within the grace period");
        scheduler.registry().cancel_all().await;
    }

    db.close().await;
    tracing::info!("nc server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
