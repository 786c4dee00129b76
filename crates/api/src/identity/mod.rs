//! Bearer-credential resolution against the identity provider.
//!
//! The API never validates tokens itself. Each authenticated request forwards
//! the caller's bearer credential to the provider's OpenID Connect `userinfo`
//! endpoint and trusts the `sub` claim it returns.
//!
//! # Flow
//!
//! 1. Extract the credential from the `Authorization` header
//! 2. `GET <userinfo endpoint>` with `Authorization: Bearer <credential>`
//! 3. Parse the JSON body into [`UserInfoClaims`]
//! 4. Validate the claims into an [`Identity`] (non-empty `sub` required)
//!
//! No caching: every call re-validates with the provider.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

use table_recipes_core::{Identity, UserInfoClaims};

use crate::config::IdentityConfig;

/// Resolves a bearer credential into a verified identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve `credential` (without the `Bearer ` prefix).
    ///
    /// # Errors
    ///
    /// See [`AuthError`] for the failure modes. None are retried.
    async fn resolve(&self, credential: &str) -> Result<Identity, AuthError>;
}

/// Identity resolver backed by an OpenID Connect `userinfo` endpoint
/// (e.g. Keycloak's `/realms/{realm}/protocol/openid-connect/userinfo`).
#[derive(Clone)]
pub struct UserInfoClient {
    inner: Arc<UserInfoClientInner>,
}

struct UserInfoClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl UserInfoClient {
    /// Create a new userinfo client.
    ///
    /// The configured timeout bounds the whole round trip (connect, headers
    /// and body).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TransportFailure` if the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::TransportFailure(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(UserInfoClientInner {
                client,
                endpoint: config.userinfo_endpoint.clone(),
            }),
        })
    }

    /// The configured userinfo endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

#[async_trait]
impl IdentityResolver for UserInfoClient {
    #[instrument(skip(self, credential), fields(endpoint = %self.inner.endpoint))]
    async fn resolve(&self, credential: &str) -> Result<Identity, AuthError> {
        if credential.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .bearer_auth(credential)
            .send()
            .await
            .map_err(AuthError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Identity provider rejected credential");
            return Err(AuthError::Unauthenticated);
        }

        let body = response.bytes().await.map_err(AuthError::from_transport)?;
        let claims: UserInfoClaims = serde_json::from_slice(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        let identity =
            Identity::try_from(claims).map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        debug!(user_id = %identity.subject, "Resolved identity");
        Ok(identity)
    }
}
