//! Posture API server

use std::sync::Arc;

use anyhow::Result;
use posture_engine::{DriftScheduler, PostureEngine, SimulationConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SimulationConfig::default();
    let engine = Arc::new(PostureEngine::new(config));
    DriftScheduler::new(Arc::clone(&engine)).spawn();

    let port: u16 = std::env::var("POSTURE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "posture API listening");

    axum::serve(listener, posture_api::build_router(engine)).await?;
    Ok(())
}
