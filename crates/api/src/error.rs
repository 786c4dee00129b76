//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use table_recipes_core::RecipeError;

use crate::db::StoreError;
use crate::identity::AuthError;
use crate::response::ApiResponse;
use crate::services::favorites::{ListError, ToggleError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bearer credential could not be resolved.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Favorites toggle failed.
    #[error("Toggle error: {0}")]
    Toggle(#[from] ToggleError),

    /// Favorites listing failed.
    #[error("List error: {0}")]
    List(#[from] ListError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Submitted recipe is invalid.
    #[error("Invalid recipe: {0}")]
    Recipe(#[from] RecipeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => auth_status(err),
            Self::Toggle(ToggleError::Forbidden) | Self::List(ListError::Forbidden) => {
                StatusCode::FORBIDDEN
            }
            Self::Toggle(ToggleError::RecipeNotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Toggle(ToggleError::Storage(err))
            | Self::List(ListError::Storage(err))
            | Self::Store(err) => store_status(err),
            Self::Recipe(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::Auth(AuthError::MissingCredential | AuthError::Unauthenticated) => {
                "Unauthorized".to_string()
            }
            Self::Auth(AuthError::Timeout) => "Identity provider timed out".to_string(),
            Self::Auth(_) => "Identity provider error".to_string(),
            Self::Toggle(ToggleError::Forbidden) | Self::List(ListError::Forbidden) => {
                "Forbidden".to_string()
            }
            Self::Toggle(ToggleError::RecipeNotFound(id)) => {
                format!("No recipe with ID {id}")
            }
            Self::Recipe(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(msg) => msg.clone(),
            Self::Store(StoreError::InvalidPattern(reason)) => {
                format!("Invalid search term: {reason}")
            }
            _ if self.status() == StatusCode::GATEWAY_TIMEOUT => "Request timed out".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

const fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::MissingCredential | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AuthError::TransportFailure(_) | AuthError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
        AuthError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

const fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists => StatusCode::CONFLICT,
        StoreError::InvalidPattern(_) => StatusCode::BAD_REQUEST,
        StoreError::Database(_) | StoreError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        ApiResponse::new(status, "error", self.client_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a resolved subject.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::to_bytes;
    use table_recipes_core::RecipeId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("recipe-123".to_string());
        assert_eq!(err.to_string(), "Not found: recipe-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Toggle(ToggleError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::List(ListError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::MissingCredential)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::TransportFailure("dns".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::MalformedResponse("no sub".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Timeout)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            get_status(AppError::List(ListError::Storage(StoreError::Timeout(
                Duration::from_secs(1)
            )))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            get_status(AppError::Toggle(ToggleError::RecipeNotFound(RecipeId::new("r9")))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Recipe(RecipeError::EmptyTitle)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::DataCorruption("bad".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_forbidden_body_has_no_detail() {
        let response = AppError::Toggle(ToggleError::Forbidden).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 403);
        assert_eq!(json["data"]["data"], "Forbidden");
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_bad_request() {
        let response = AppError::Store(StoreError::InvalidPattern(
            "invalid escape \\ sequence".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["data"]["data"],
            "Invalid search term: invalid escape \\ sequence"
        );
    }

    #[tokio::test]
    async fn test_storage_detail_is_hidden() {
        let response =
            AppError::Store(StoreError::DataCorruption("row 7 broken".to_string())).into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("row 7"));
        assert!(text.contains("Internal server error"));
    }
}
