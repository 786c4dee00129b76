//! Bearer authentication extractor.
//!
//! Provides [`RequireIdentity`], which resolves the request's bearer
//! credential through the identity provider before the handler runs.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use table_recipes_core::Identity;

use crate::error::{AppError, set_sentry_user};
use crate::identity::AuthError;
use crate::state::AppState;

/// Extractor that requires a resolvable bearer credential.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireIdentity(identity): RequireIdentity,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.display_name)
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Error returned when a request cannot be authenticated.
#[derive(Debug)]
pub enum AuthRejection {
    /// No usable `Authorization` header.
    MissingCredential,
    /// The identity provider refused or failed to resolve the credential.
    Resolve(AuthError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::MissingCredential => AppError::Auth(AuthError::MissingCredential),
            Self::Resolve(err) => AppError::Auth(err),
        }
        .into_response()
    }
}

const BEARER: &str = "Bearer";

/// The credential carried in the `Authorization` header.
///
/// A leading `Bearer` scheme, matched case-insensitively, is stripped when
/// present. Returns `None` when the header is missing, not valid UTF-8 or
/// blank.
#[must_use]
pub fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let credential = match value.split_at_checked(BEARER.len()) {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case(BEARER)
                && (rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_whitespace())) =>
        {
            rest.trim_start()
        }
        _ => value,
    };
    (!credential.is_empty()).then_some(credential)
}

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential =
            bearer_credential(&parts.headers).ok_or(AuthRejection::MissingCredential)?;

        let identity = state
            .favorites()
            .authenticate(credential)
            .await
            .map_err(AuthRejection::Resolve)?;

        let email = Some(identity.email.as_str()).filter(|email| !email.is_empty());
        set_sentry_user(&identity.subject, email);
        tracing::Span::current().record("user_id", identity.subject.as_str());

        Ok(Self(identity))
    }
}
