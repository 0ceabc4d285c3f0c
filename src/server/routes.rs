use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::server::handlers;
use crate::server::state::AppState;

/// URL prefix of generated files.
pub const ARTIFACTS_PATH: &str = "/artifacts";

const ARTIFACT_ROUTE: &str = "/artifacts/{name}";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/api/status", get(handlers::status))
        .route("/api/examples", get(handlers::examples))
        .route("/api/generate", post(handlers::generate))
        .route(ARTIFACT_ROUTE, get(handlers::artifact))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
