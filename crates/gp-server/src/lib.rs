//! Greenprompt HTTP API server (Axum).
//!
//! REST endpoints for single and batch prompt compression plus
//! health monitoring.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use gp_compressor::CompressionPipeline;
use gp_embed::HashEmbedder;
use state::AppState;
use std::sync::Arc;

/// Build the application router with the default pipeline (built-in filler
/// rules, hash embedder).
pub fn app() -> gp_core::Result<Router> {
    let pipeline = CompressionPipeline::with_defaults(Arc::new(HashEmbedder::default()))?;
    Ok(app_with_state(AppState::new(Arc::new(pipeline))))
}

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::compress_routes())
        .with_state(state)
}

/// Serve the API on the given address until shutdown.
pub async fn serve(addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = app()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "greenprompt server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
