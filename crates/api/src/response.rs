//! JSON response envelope.
//!
//! Every `/api/v1` response, success or failure, has the same shape:
//!
//! ```json
//! { "status": 200, "message": "...", "data": { "data": <payload> } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Envelope around a response payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    pub message: String,
    pub data: Payload<T>,
}

/// Inner wrapper, kept for client compatibility.
#[derive(Debug, Serialize)]
pub struct Payload<T> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Build an envelope with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: Payload { data },
        }
    }

    /// `200 OK` envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    /// `201 Created` envelope.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
