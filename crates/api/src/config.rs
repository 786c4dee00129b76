//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RECIPES_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `KC_USERINFO_ENDPOINT` - OpenID Connect userinfo endpoint used to resolve bearer tokens
//!
//! ## Optional
//! - `RECIPES_HOST` - Bind address (default: 0.0.0.0)
//! - `RECIPES_PORT` - Listen port (default: 8080)
//! - `CORS_ALLOWED_LIST` - Comma-separated list of allowed browser origins
//! - `IDENTITY_TIMEOUT_SECS` - Bound on the userinfo round trip (default: 10)
//! - `STORE_TIMEOUT_SECS` - Bound on each database operation (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Origins allowed to make cross-origin requests
    pub cors_allowed_origins: Vec<String>,
    /// Upper bound on each store operation
    pub store_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Identity provider (userinfo endpoint) configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Fully-qualified userinfo endpoint
    pub userinfo_endpoint: Url,
    /// Upper bound on the userinfo round trip
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("RECIPES_DATABASE_URL")?;
        let host = get_env_or_default("RECIPES_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RECIPES_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("RECIPES_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("RECIPES_PORT".to_string(), e.to_string()))?;

        let identity = IdentityConfig::from_env()?;
        let cors_allowed_origins =
            parse_origin_list(&get_optional_env("CORS_ALLOWED_LIST").unwrap_or_default());
        let store_timeout = get_timeout("STORE_TIMEOUT_SECS")?;

        Ok(Self {
            database_url,
            host,
            port,
            identity,
            cors_allowed_origins,
            store_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("KC_USERINFO_ENDPOINT")?;
        Ok(Self {
            userinfo_endpoint: parse_endpoint("KC_USERINFO_ENDPOINT", &raw)?,
            timeout: get_timeout("IDENTITY_TIMEOUT_SECS")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_timeout(key: &str) -> Result<Duration, ConfigError> {
    match get_optional_env(key) {
        Some(raw) => parse_timeout_secs(key, &raw),
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}

/// Parse a whole number of seconds; zero is rejected since it would fail every call.
fn parse_timeout_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse an absolute http(s) URL.
fn parse_endpoint(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_list() {
        let origins =
            parse_origin_list("http://localhost:3000, https://recipes.example.com/ ,,");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "https://recipes.example.com"]
        );
    }

    #[test]
    fn test_parse_origin_list_empty() {
        assert!(parse_origin_list("").is_empty());
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(
            parse_timeout_secs("T", "15").unwrap(),
            Duration::from_secs(15)
        );
        assert!(matches!(
            parse_timeout_secs("T", "0"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_timeout_secs("T", "ten"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_endpoint() {
        let url = parse_endpoint(
            "KC",
            "https://auth.example.com/realms/recipes/protocol/openid-connect/userinfo",
        )
        .unwrap();
        assert_eq!(url.host_str(), Some("auth.example.com"));

        assert!(parse_endpoint("KC", "not a url").is_err());
        assert!(parse_endpoint("KC", "ftp://auth.example.com/userinfo").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            identity: IdentityConfig {
                userinfo_endpoint: Url::parse("http://localhost:8081/userinfo").unwrap(),
                timeout: Duration::from_secs(10),
            },
            cors_allowed_origins: Vec::new(),
            store_timeout: Duration::from_secs(10),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_config_debug_redacts_database_url() {
        let config = IdentityConfig {
            userinfo_endpoint: Url::parse("http://localhost:8081/userinfo").unwrap(),
            timeout: Duration::from_secs(10),
        };
        let database_url = SecretString::from("postgres://user:hunter2@db/recipes");

        assert!(format!("{config:?}").contains("localhost:8081"));
        assert!(!format!("{database_url:?}").contains("hunter2"));
    }
}
