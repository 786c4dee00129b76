//! In-process store implementations.
//!
//! Same contracts as the `PostgreSQL` stores, kept in memory behind a
//! `tokio::sync::RwLock`. Used by tests and for running the API without a
//! database.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use regex::RegexBuilder;
use tokio::sync::RwLock;

use table_recipes_core::{Recipe, RecipeId, UserFavorites, UserId};

use super::{RecipeStore, StoreError, UserFavoritesStore};

/// In-memory recipe catalog, ordered by id.
#[derive(Default)]
pub struct InMemoryRecipeStore {
    recipes: RwLock<BTreeMap<RecipeId, Recipe>>,
}

impl InMemoryRecipeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `recipes`.
    #[must_use]
    pub fn with_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let map = recipes
            .into_iter()
            .map(|recipe| (recipe.id.clone(), recipe))
            .collect();
        Self {
            recipes: RwLock::new(map),
        }
    }

    async fn filtered(&self, keep: impl Fn(&Recipe) -> bool + Send) -> Vec<Recipe> {
        self.recipes
            .read()
            .await
            .values()
            .filter(|recipe| keep(recipe))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().await.get(id).cloned())
    }

    async fn find_by_author(&self, author_id: &UserId) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.filtered(|recipe| &recipe.author_id == author_id).await)
    }

    async fn find_by_ids(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;
        Ok(ids.iter().filter_map(|id| recipes.get(id).cloned()).collect())
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let mut recipes = self.recipes.write().await;
        if recipes.contains_key(&recipe.id) {
            return Err(StoreError::AlreadyExists);
        }
        recipes.insert(recipe.id.clone(), recipe.clone());
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, StoreError> {
        Ok(self.recipes.write().await.remove(id).is_some())
    }

    async fn search_by_title(&self, pattern: &str) -> Result<Vec<Recipe>, StoreError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::InvalidPattern(e.to_string()))?;
        Ok(self.filtered(|recipe| regex.is_match(&recipe.title)).await)
    }
}

/// In-memory favorites keyed by user id.
///
/// Counts successful writes so callers can assert that an operation left the
/// store untouched.
#[derive(Default)]
pub struct InMemoryFavoritesStore {
    records: RwLock<HashMap<UserId, UserFavorites>>,
    writes: AtomicUsize,
}

impl InMemoryFavoritesStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = UserFavorites>) -> Self {
        let map = records
            .into_iter()
            .map(|favorites| (favorites.user_id.clone(), favorites))
            .collect();
        Self {
            records: RwLock::new(map),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `create` and `upsert` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current record for `user_id`, bypassing the store trait.
    pub async fn snapshot(&self, user_id: &UserId) -> Option<UserFavorites> {
        self.records.read().await.get(user_id).cloned()
    }
}

#[async_trait]
impl UserFavoritesStore for InMemoryFavoritesStore {
    async fn get(&self, user_id: &UserId) -> Result<UserFavorites, StoreError> {
        self.records
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn upsert(&self, favorites: &UserFavorites) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(favorites.user_id.clone(), favorites.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create(&self, favorites: &UserFavorites) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&favorites.user_id) {
            return Err(StoreError::AlreadyExists);
        }
        records.insert(favorites.user_id.clone(), favorites.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recipe(id: &str, title: &str, author: &str) -> Recipe {
        Recipe {
            id: RecipeId::new(id),
            title: title.to_string(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            author_id: UserId::new(author),
            image_links: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let store = InMemoryRecipeStore::with_recipes([
            recipe("r1", "Soup", "u1"),
            recipe("r2", "Stew", "u1"),
        ]);

        let found = store
            .find_by_ids(&[RecipeId::new("r2"), RecipeId::new("gone")])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, RecipeId::new("r2"));

        assert!(store.find_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let store = InMemoryRecipeStore::new();
        store.insert(&recipe("r1", "Soup", "u1")).await.unwrap();
        assert!(matches!(
            store.insert(&recipe("r1", "Other", "u2")).await,
            Err(StoreError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_search_by_title_is_case_insensitive() {
        let store = InMemoryRecipeStore::with_recipes([
            recipe("r1", "Tomato Soup", "u1"),
            recipe("r2", "Beef Stew", "u1"),
        ]);
        let found = store.search_by_title("soup").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Tomato Soup");
    }

    #[tokio::test]
    async fn test_search_rejects_uncompilable_pattern() {
        let store = InMemoryRecipeStore::with_recipes([recipe("r1", "Tomato Soup", "u1")]);
        assert!(matches!(
            store.search_by_title("(unclosed").await,
            Err(StoreError::InvalidPattern(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_author_and_delete() {
        let store = InMemoryRecipeStore::with_recipes([
            recipe("r1", "Soup", "u1"),
            recipe("r2", "Stew", "u2"),
        ]);
        assert_eq!(store.find_by_author(&UserId::new("u2")).await.unwrap().len(), 1);
        assert!(store.delete(&RecipeId::new("r2")).await.unwrap());
        assert!(!store.delete(&RecipeId::new("r2")).await.unwrap());
        assert!(store.find_by_author(&UserId::new("u2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorites_get_create_upsert() {
        let store = InMemoryFavoritesStore::new();
        let user = UserId::new("u1");

        assert!(matches!(store.get(&user).await, Err(StoreError::NotFound)));

        let first = UserFavorites::from_ids(user.clone(), [RecipeId::new("r1")]);
        store.create(&first).await.unwrap();
        assert!(matches!(
            store.create(&first).await,
            Err(StoreError::AlreadyExists)
        ));

        let replaced = UserFavorites::from_ids(user.clone(), [RecipeId::new("r2")]);
        store.upsert(&replaced).await.unwrap();
        assert_eq!(store.get(&user).await.unwrap(), replaced);
        assert_eq!(store.write_count(), 2);
    }
}
