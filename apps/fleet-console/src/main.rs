// [[FLEET]]/apps/fleet-console/src/main.rs
// Purpose: Entry point. Restores preferences, seeds the console state and starts the server.
// Architecture: Application Boot
// Dependencies: Axum, Tower, Tokio

mod agents;
mod chat;
mod config;
mod documents;
mod editor;
mod error;
mod events;
mod locale;
mod memory;
mod models;
mod monitoring;
mod params;
mod repository;
mod runtime;
mod runtime_config;
mod sample;
mod server;
mod shell;
mod tasks;
mod transfer;
mod translations;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::ConsoleConfig;
use crate::locale::FilePreferenceStore;
use crate::repository::SimulatedRepository;
use crate::runtime::FleetRuntime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG wins over the defaults
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fleet_console=debug,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Initializing fleet console...");

    let config = ConsoleConfig::from_env();
    let preferences = Arc::new(FilePreferenceStore::new(&config.preferences_file));
    let repository = Arc::new(SimulatedRepository::new(config.simulated_latency));
    let addr = config.addr();

    let runtime = Arc::new(FleetRuntime::new(config, preferences, repository));
    tracing::info!("Active locale: {}", runtime.i18n.locale().as_str());

    let app = server::router(runtime.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Fleet console listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(runtime))
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal(runtime: Arc<FleetRuntime>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
    runtime.shutdown();
}
