pub mod access;
pub mod catalog;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod providers;
pub mod routes;
pub mod service;
pub mod state;
pub mod ui;

use anyhow::Result;
use std::net::SocketAddr;
use tracing::{debug, info};

use crate::state::AppState;

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Aksjeradar starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let bind = config.server.bind.clone();
    let port = config.server.port;
    let state = AppState::new(config)?;
    let app = routes::router(state);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("Aksjeradar listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, gracefully stopping...");
    }
}
