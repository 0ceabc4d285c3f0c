//! HTTP server.
//!
//! Axum app serving the web page, the status and generation API, and the
//! generated artifacts.

use std::net::SocketAddr;

use anyhow::Result;

use crate::gate::GenerationGate;

pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: SocketAddr, gate: GenerationGate) -> Result<()> {
    let state = state::AppState::new(gate);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
