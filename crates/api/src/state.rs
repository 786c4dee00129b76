//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::{RecipeStore, UserFavoritesStore};
use crate::identity::IdentityResolver;
use crate::services::favorites::{FavoritesService, Timeouts};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// stores, the favorites service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    recipes: Arc<dyn RecipeStore>,
    favorites: FavoritesService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration (timeouts are taken from here)
    /// * `recipes` - Recipe catalog
    /// * `favorites` - Per-user favorites store
    /// * `identity` - Bearer credential resolver
    #[must_use]
    pub fn new(
        config: ApiConfig,
        recipes: Arc<dyn RecipeStore>,
        favorites: Arc<dyn UserFavoritesStore>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        let timeouts = Timeouts {
            identity: config.identity.timeout,
            store: config.store_timeout,
        };
        let favorites = FavoritesService::new(identity, Arc::clone(&recipes), favorites, timeouts);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                recipes,
                favorites,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the recipe catalog.
    #[must_use]
    pub fn recipes(&self) -> &dyn RecipeStore {
        self.inner.recipes.as_ref()
    }

    /// Get a reference to the favorites service.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesService {
        &self.inner.favorites
    }
}
