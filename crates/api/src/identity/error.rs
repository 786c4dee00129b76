//! Identity resolution error types.

use thiserror::Error;

/// Errors that can occur while resolving a bearer credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("missing bearer credential")]
    MissingCredential,

    /// The identity provider could not be reached (network, DNS, TLS).
    #[error("identity provider unreachable: {0}")]
    TransportFailure(String),

    /// The identity provider did not answer in time.
    #[error("identity provider timed out")]
    Timeout,

    /// The identity provider rejected the credential.
    #[error("credential rejected by identity provider")]
    Unauthenticated,

    /// The response body is not JSON or has no subject.
    #[error("malformed identity response: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    /// Classify a `reqwest` failure as a timeout or a transport failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::TransportFailure(err.to_string())
        }
    }
}
