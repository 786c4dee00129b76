//! HTTP route handlers for the recipes API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness
//! GET    /health/ready                - Readiness (recipe store ping)
//!
//! # Recipes
//! GET    /api/v1/recipes              - All recipes
//! POST   /api/v1/recipes              - Create a recipe
//! GET    /api/v1/recipes/me           - Recipes authored by the caller (bearer)
//! POST   /api/v1/recipes/search       - Title search (regex)
//! GET    /api/v1/recipes/{id}         - One recipe
//! DELETE /api/v1/recipes/{id}         - Delete a recipe
//!
//! # Favorites (bearer, own user only)
//! GET    /api/v1/users/{id}/recipes   - Favorite recipes
//! POST   /api/v1/users/{id}/recipes   - Add or remove a favorite
//! ```

pub mod favorites;
pub mod health;
pub mod recipes;

use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::{Span, field::Empty};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::index).post(recipes::create))
        .route("/me", get(recipes::mine))
        .route("/search", post(recipes::search))
        .route("/{id}", get(recipes::show).delete(recipes::destroy))
}

/// Create the per-user favorites router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}/recipes",
        get(favorites::index).post(favorites::toggle),
    )
}

/// Create all `/api/v1` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/recipes", recipe_routes())
        .nest("/users", user_routes())
}

/// Build the complete application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can serve this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_allowed_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", routes())
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = Empty,
                        user_id = Empty,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
}

/// CORS for the configured browser origins. Unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "We couldn't find the page you requested!" })),
    )
}
