pub mod analysis;
pub mod api;
pub mod app_state;
pub mod config;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod models;
pub mod output;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Settings, FRED_API_KEY_VAR};
use crate::core::orchestrator::ChartCache;
use crate::core::scheduler::CacheSweeper;
use crate::indicators::registry::Registry;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Starts the HTTP server and the cache sweeper; returns after Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::from_env();
    info!(?settings, "Loaded settings");

    // Only a hint: the key is resolved again on every fetch.
    if std::env::var(FRED_API_KEY_VAR).map(|k| k.trim().is_empty()).unwrap_or(true) {
        warn!("{} is not set, chart requests will fail until it is", FRED_API_KEY_VAR);
    }

    let cache = Arc::new(ChartCache::new());
    let sweeper = CacheSweeper::start(cache.clone(), settings.sweep_interval).await?;

    let state = Arc::new(AppState::from_settings(&settings, cache));
    let app = api::rest::router(state);

    let slugs: Vec<&str> = Registry::all().iter().map(|i| i.slug()).collect();
    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;
    info!(addr = %settings.bind_addr(), indicators = ?slugs, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    sweeper.shutdown().await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
