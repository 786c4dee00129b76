//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::db::bounded;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Pings the recipe store. Returns 503 Service Unavailable if it is not
/// reachable within the store timeout.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match bounded(state.config().store_timeout, state.recipes().ping()).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
