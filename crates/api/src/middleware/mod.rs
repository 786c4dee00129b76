//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (configured origins only)
//!
//! Bearer authentication is an extractor rather than a layer so that only
//! the routes that need an identity pay for the provider round trip.

pub mod auth;
pub mod request_id;

pub use auth::{AuthRejection, RequireIdentity, bearer_credential};
pub use request_id::request_id_middleware;
