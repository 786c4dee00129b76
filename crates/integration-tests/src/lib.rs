//! Integration test harness for Table Recipes.
//!
//! Everything runs in-process: in-memory stores stand in for `PostgreSQL`
//! and a `wiremock` server stands in for the identity provider, so
//! `cargo test -p table-recipes-integration-tests` needs no services.
//!
//! # Test Categories
//!
//! - `favorites_service` - toggle and list rules over in-memory stores
//! - `identity_resolver` - userinfo client against a mock provider
//! - `api_routes` - HTTP round trips against the served router

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use table_recipes_api::config::{ApiConfig, IdentityConfig};
use table_recipes_api::db::{InMemoryFavoritesStore, InMemoryRecipeStore};
use table_recipes_api::identity::{AuthError, IdentityResolver, UserInfoClient};
use table_recipes_api::routes;
use table_recipes_api::services::favorites::{FavoritesService, Timeouts};
use table_recipes_api::state::AppState;
use table_recipes_core::{Identity, Recipe, RecipeId, UserFavorites, UserId, UserInfoClaims};

/// Path the mock identity provider serves userinfo on.
pub const USERINFO_PATH: &str = "/realms/recipes/protocol/openid-connect/userinfo";

/// Origin allowed by the test CORS configuration.
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// A catalog recipe with only the fields tests care about.
#[must_use]
pub fn recipe(id: &str, title: &str, author: &str) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        title: title.to_string(),
        ingredients: vec!["salt".to_string()],
        instructions: vec!["Cook".to_string()],
        author_id: UserId::new(author),
        image_links: String::new(),
    }
}

/// An identity whose subject is `sub`.
#[must_use]
pub fn identity(sub: &str) -> Identity {
    Identity::try_from(UserInfoClaims {
        sub: Some(sub.to_string()),
        ..UserInfoClaims::default()
    })
    .unwrap()
}

/// Favorites record for `user` holding `ids` in order.
#[must_use]
pub fn favorites(user: &str, ids: &[&str]) -> UserFavorites {
    UserFavorites::from_ids(UserId::new(user), ids.iter().copied().map(RecipeId::from))
}

/// Resolver that treats the credential itself as the subject.
///
/// The credential `"rejected"` is refused as `AuthError::Unauthenticated`.
pub struct CredentialIsSubject;

#[async_trait]
impl IdentityResolver for CredentialIsSubject {
    async fn resolve(&self, credential: &str) -> Result<Identity, AuthError> {
        if credential == "rejected" {
            return Err(AuthError::Unauthenticated);
        }
        Ok(identity(credential))
    }
}

/// Favorites service over in-memory stores, with handles to both stores.
pub struct ServiceFixture {
    pub service: FavoritesService,
    pub recipes: Arc<InMemoryRecipeStore>,
    pub favorites: Arc<InMemoryFavoritesStore>,
}

impl ServiceFixture {
    /// Build a service over `catalog` and pre-existing `records`.
    #[must_use]
    pub fn new(
        catalog: impl IntoIterator<Item = Recipe>,
        records: impl IntoIterator<Item = UserFavorites>,
    ) -> Self {
        let recipes = Arc::new(InMemoryRecipeStore::with_recipes(catalog));
        let favorites = Arc::new(InMemoryFavoritesStore::with_records(records));
        let service = FavoritesService::new(
            Arc::new(CredentialIsSubject),
            recipes.clone(),
            favorites.clone(),
            Timeouts::default(),
        );
        Self {
            service,
            recipes,
            favorites,
        }
    }
}

/// Configuration pointing the identity client at `idp`.
#[must_use]
pub fn test_config(idp: &MockServer) -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://unused@localhost/recipes".to_string()),
        host: [127, 0, 0, 1].into(),
        port: 0,
        identity: IdentityConfig {
            userinfo_endpoint: Url::parse(&format!("{}{USERINFO_PATH}", idp.uri())).unwrap(),
            timeout: Duration::from_secs(2),
        },
        cors_allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
        store_timeout: Duration::from_secs(2),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Register a userinfo response on `idp` for `token`.
pub async fn mock_userinfo(idp: &MockServer, token: &str, sub: &str) {
    Mock::given(method("GET"))
        .and(path(USERINFO_PATH))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": sub,
            "email_verified": true,
            "name": "Test Cook",
            "preferred_username": sub,
            "given_name": "Test",
            "family_name": "Cook",
            "email": format!("{sub}@example.com"),
        })))
        .mount(idp)
        .await;
}

/// The API served on an ephemeral port, backed by in-memory stores and a
/// mock identity provider.
///
/// Credentials without a registered userinfo mock get a 404 from the
/// provider and are therefore rejected.
pub struct TestApp {
    pub address: SocketAddr,
    pub client: Client,
    pub idp: MockServer,
    pub recipes: Arc<InMemoryRecipeStore>,
    pub favorites: Arc<InMemoryFavoritesStore>,
}

impl TestApp {
    /// Start the API over `catalog` and pre-existing `records`.
    pub async fn spawn(
        catalog: impl IntoIterator<Item = Recipe>,
        records: impl IntoIterator<Item = UserFavorites>,
    ) -> Self {
        let idp = MockServer::start().await;
        let config = test_config(&idp);

        let recipes = Arc::new(InMemoryRecipeStore::with_recipes(catalog));
        let favorites = Arc::new(InMemoryFavoritesStore::with_records(records));
        let identity = UserInfoClient::new(&config.identity).unwrap();
        let state = AppState::new(
            config,
            recipes.clone(),
            favorites.clone(),
            Arc::new(identity),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = routes::app(state);
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self {
            address,
            client: Client::new(),
            idp,
            recipes,
            favorites,
        }
    }

    /// Absolute URL for `path` on the served API.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    /// Accept `token` as a credential for `sub`.
    pub async fn login(&self, token: &str, sub: &str) {
        mock_userinfo(&self.idp, token, sub).await;
    }
}
