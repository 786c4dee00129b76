//! Favorites service.
//!
//! Owns the rules for a user's favorite recipes: who may change them, how
//! add and remove behave when repeated, and how stored ids are reconciled
//! with the recipe catalog.
//!
//! Collaborators are injected as trait objects so the same service runs over
//! `PostgreSQL` in production and in-memory stores in tests.

mod error;

pub use error::{ListError, ToggleError};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use table_recipes_core::{Identity, Recipe, RecipeId, UserFavorites, UserId};

use crate::db::{RecipeStore, StoreError, UserFavoritesStore, bounded};
use crate::identity::{AuthError, IdentityResolver};

/// Time bounds on the service's suspension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Bound on the identity provider round trip.
    pub identity: Duration,
    /// Bound on each individual store call.
    pub store: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            identity: Duration::from_secs(10),
            store: Duration::from_secs(10),
        }
    }
}

/// Favorites service.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct FavoritesService {
    identity: Arc<dyn IdentityResolver>,
    recipes: Arc<dyn RecipeStore>,
    favorites: Arc<dyn UserFavoritesStore>,
    timeouts: Timeouts,
}

impl FavoritesService {
    /// Create a new favorites service.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        recipes: Arc<dyn RecipeStore>,
        favorites: Arc<dyn UserFavoritesStore>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            identity,
            recipes,
            favorites,
            timeouts,
        }
    }

    /// Resolve a bearer credential into the requester's identity.
    ///
    /// # Errors
    ///
    /// Returns the resolver's `AuthError`, or `AuthError::Timeout` if the
    /// provider does not answer within the identity bound.
    pub async fn authenticate(&self, credential: &str) -> Result<Identity, AuthError> {
        tokio::time::timeout(self.timeouts.identity, self.identity.resolve(credential))
            .await
            .map_err(|_| AuthError::Timeout)?
    }

    /// Add (`add == true`) or remove `recipe_id` from `target`'s favorites.
    ///
    /// Repeating either intent is a no-op. A user's first add creates their
    /// record; removing from a user with no record writes nothing and returns
    /// an empty set.
    ///
    /// # Errors
    ///
    /// - `ToggleError::Forbidden` if `requester` is not `target`
    /// - `ToggleError::RecipeNotFound` if adding a recipe that does not exist
    /// - `ToggleError::Storage` if a store call fails or times out
    #[instrument(skip_all, fields(user_id = %target, recipe_id = %recipe_id, add))]
    pub async fn toggle_favorite(
        &self,
        requester: &Identity,
        target: &UserId,
        recipe_id: &RecipeId,
        add: bool,
    ) -> Result<UserFavorites, ToggleError> {
        if !requester.owns(target) {
            warn!(requester = %requester.subject, "Rejected favorites change for another user");
            return Err(ToggleError::Forbidden);
        }

        if add && self.bounded(self.recipes.find_by_id(recipe_id)).await?.is_none() {
            return Err(ToggleError::RecipeNotFound(recipe_id.clone()));
        }

        let mut favorites = match self.bounded(self.favorites.get(target)).await {
            Ok(favorites) => favorites,
            Err(StoreError::NotFound) if add => {
                let favorites = UserFavorites::from_ids(target.clone(), [recipe_id.clone()]);
                self.bounded(self.favorites.create(&favorites)).await?;
                info!("Created favorites with first recipe");
                return Ok(favorites);
            }
            Err(StoreError::NotFound) => {
                debug!("No favorites to remove from");
                return Ok(UserFavorites::empty(target.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if add {
            if !favorites.add(recipe_id.clone()) {
                debug!("Recipe already a favorite");
                return Ok(favorites);
            }
        } else if !favorites.remove(recipe_id) {
            debug!("Recipe was not a favorite");
        }

        self.bounded(self.favorites.upsert(&favorites)).await?;
        info!(add, count = favorites.len(), "Updated favorites");
        Ok(favorites)
    }

    /// The recipes `target` has favorited, in the order they were added.
    ///
    /// A user with no record has no favorites. Ids whose recipe no longer
    /// exists are skipped.
    ///
    /// # Errors
    ///
    /// - `ListError::Forbidden` if `requester` is not `target`
    /// - `ListError::Storage` if a store call fails or times out
    #[instrument(skip_all, fields(user_id = %target))]
    pub async fn list_favorite_recipes(
        &self,
        requester: &Identity,
        target: &UserId,
    ) -> Result<Vec<Recipe>, ListError> {
        if !requester.owns(target) {
            warn!(requester = %requester.subject, "Rejected favorites read for another user");
            return Err(ListError::Forbidden);
        }

        let favorites = match self.bounded(self.favorites.get(target)).await {
            Ok(favorites) => favorites,
            Err(StoreError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if favorites.is_empty() {
            return Ok(Vec::new());
        }

        let found = self
            .bounded(self.recipes.find_by_ids(favorites.ids()))
            .await?;
        let recipes = order_by_favorites(&favorites, found);

        let stale = favorites.len() - recipes.len();
        if stale > 0 {
            debug!(stale, "Skipped favorites with no matching recipe");
        }
        Ok(recipes)
    }

    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        bounded(self.timeouts.store, operation).await
    }
}

/// Arrange `found` in the order of `favorites`, dropping ids with no recipe.
fn order_by_favorites(favorites: &UserFavorites, found: Vec<Recipe>) -> Vec<Recipe> {
    let mut by_id: HashMap<RecipeId, Recipe> = found
        .into_iter()
        .map(|recipe| (recipe.id.clone(), recipe))
        .collect();
    favorites
        .ids()
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use table_recipes_core::UserInfoClaims;

    use super::*;
    use crate::db::{InMemoryFavoritesStore, InMemoryRecipeStore};

    struct FixedIdentity;

    #[async_trait]
    impl IdentityResolver for FixedIdentity {
        async fn resolve(&self, credential: &str) -> Result<Identity, AuthError> {
            Identity::try_from(UserInfoClaims {
                sub: Some(credential.to_string()),
                ..UserInfoClaims::default()
            })
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))
        }
    }

    struct StalledIdentity;

    #[async_trait]
    impl IdentityResolver for StalledIdentity {
        async fn resolve(&self, _credential: &str) -> Result<Identity, AuthError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(AuthError::Unauthenticated)
        }
    }

    /// Favorites store whose reads hang and whose writes fail.
    struct BrokenFavorites {
        stall_reads: bool,
    }

    #[async_trait]
    impl UserFavoritesStore for BrokenFavorites {
        async fn get(&self, user_id: &UserId) -> Result<UserFavorites, StoreError> {
            if self.stall_reads {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(UserFavorites::empty(user_id.clone()))
        }

        async fn upsert(&self, _favorites: &UserFavorites) -> Result<(), StoreError> {
            Err(StoreError::DataCorruption("disk full".to_string()))
        }

        async fn create(&self, _favorites: &UserFavorites) -> Result<(), StoreError> {
            Err(StoreError::DataCorruption("disk full".to_string()))
        }
    }

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: RecipeId::new(id),
            title: format!("Recipe {id}"),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            author_id: UserId::new("chef"),
            image_links: String::new(),
        }
    }

    fn service_with(
        identity: Arc<dyn IdentityResolver>,
        favorites: Arc<dyn UserFavoritesStore>,
    ) -> FavoritesService {
        let recipes = Arc::new(InMemoryRecipeStore::with_recipes([recipe("r1"), recipe("r2")]));
        FavoritesService::new(identity, recipes, favorites, Timeouts::default())
    }

    #[tokio::test]
    async fn test_authenticate_delegates_to_resolver() {
        let service = service_with(Arc::new(FixedIdentity), Arc::new(InMemoryFavoritesStore::new()));
        let identity = service.authenticate("u1").await.unwrap();
        assert_eq!(identity.subject, UserId::new("u1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_authenticate_times_out() {
        let service = service_with(Arc::new(StalledIdentity), Arc::new(InMemoryFavoritesStore::new()));
        assert!(matches!(
            service.authenticate("u1").await,
            Err(AuthError::Timeout)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out() {
        let service = service_with(
            Arc::new(FixedIdentity),
            Arc::new(BrokenFavorites { stall_reads: true }),
        );
        let requester = service.authenticate("u1").await.unwrap();

        let result = service
            .list_favorite_recipes(&requester, &UserId::new("u1"))
            .await;
        assert!(matches!(
            result,
            Err(ListError::Storage(StoreError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_as_storage_error() {
        let service = service_with(
            Arc::new(FixedIdentity),
            Arc::new(BrokenFavorites { stall_reads: false }),
        );
        let requester = service.authenticate("u1").await.unwrap();

        let result = service
            .toggle_favorite(&requester, &UserId::new("u1"), &RecipeId::new("r1"), true)
            .await;
        assert!(matches!(
            result,
            Err(ToggleError::Storage(StoreError::DataCorruption(_)))
        ));
    }

    #[tokio::test]
    async fn test_add_unknown_recipe_is_rejected_without_writing() {
        let store = Arc::new(InMemoryFavoritesStore::new());
        let service = service_with(Arc::new(FixedIdentity), store.clone());
        let requester = service.authenticate("u1").await.unwrap();

        let result = service
            .toggle_favorite(&requester, &UserId::new("u1"), &RecipeId::new("nope"), true)
            .await;
        assert!(matches!(result, Err(ToggleError::RecipeNotFound(id)) if id.as_str() == "nope"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_order_by_favorites_follows_insertion_order() {
        let favorites = UserFavorites::from_ids(
            UserId::new("u1"),
            ["r2", "gone", "r1"].map(RecipeId::from),
        );
        let ordered = order_by_favorites(&favorites, vec![recipe("r1"), recipe("r2")]);
        let ids: Vec<&str> = ordered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1"]);
    }
}
