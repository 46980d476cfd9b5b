//! EventHub server
//!
//! Main application entry point

use std::net::SocketAddr;
use std::time::Duration;
use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};

use EventHub::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseService},
    handlers::create_router,
    state::AppState,
    utils::logging,
};

/// How often idle rate-limit buckets are dropped
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on drop
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", EventHub::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;
    let database_service = DatabaseService::new(pool);

    // Initialize services
    info!("Initializing services...");
    let bind_address = settings.bind_address();
    let sweep_config = settings.sweep.clone();
    let state = AppState::new(settings, database_service.clone())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweep_handle = if sweep_config.enabled {
        Some(state.services.sweep_service.clone().spawn(&sweep_config, shutdown_rx.clone()))
    } else {
        info!("Event status sweep disabled");
        None
    };

    let limiter = state.auth_limiter.clone();
    let mut limiter_shutdown = shutdown_rx.clone();
    let limiter_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            tokio::select! {
                _ = ticker.tick() => limiter.cleanup(),
                _ = limiter_shutdown.changed() => break,
            }
        }
    });

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    info!(address = %bind_address, "EventHub is ready!");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutting down background tasks...");
    if shutdown_tx.send(true).is_err() {
        error!("Background tasks were already gone at shutdown");
    }
    if let Some(handle) = sweep_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "Sweep task ended abnormally");
        }
    }
    if let Err(e) = limiter_handle.await {
        error!(error = %e, "Rate limiter cleanup task ended abnormally");
    }

    database_service.close().await;
    info!("EventHub has been shut down.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
