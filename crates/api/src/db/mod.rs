//! Persistence for recipes and per-user favorites.
//!
//! # Database: `table_recipes`
//!
//! ## Tables
//!
//! - `recipes.recipe` - Recipe catalog
//! - `recipes.user_favorites` - One row per user holding their favorite recipe ids
//!
//! # Stores
//!
//! Handlers and services depend on the [`RecipeStore`] and
//! [`UserFavoritesStore`] traits, never on a concrete backend. The `PostgreSQL`
//! implementations live in [`recipes`] and [`favorites`]; [`memory`] holds
//! in-process implementations for tests and local runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p table-recipes-cli -- migrate
//! ```

pub mod favorites;
pub mod memory;
pub mod recipes;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use table_recipes_core::{Recipe, RecipeId, UserFavorites, UserId};

pub use favorites::PgFavoritesStore;
pub use memory::{InMemoryFavoritesStore, InMemoryRecipeStore};
pub use recipes::PgRecipeStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A record with the same key already exists.
    #[error("already exists")]
    AlreadyExists,

    /// A search pattern the backend's regex engine rejects.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The operation did not complete within its time bound.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Recipe catalog persistence.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError>;

    async fn find_by_author(&self, author_id: &UserId) -> Result<Vec<Recipe>, StoreError>;

    /// Fetch every recipe whose id is in `ids`.
    ///
    /// Unknown ids are skipped and an empty slice yields an empty result;
    /// neither is an error. Result order is unspecified.
    async fn find_by_ids(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>, StoreError>;

    /// Insert a new recipe. Fails with `StoreError::AlreadyExists` on id collision.
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError>;

    /// Delete a recipe. Returns whether a row was removed.
    async fn delete(&self, id: &RecipeId) -> Result<bool, StoreError>;

    /// Case-insensitive regular-expression match on the title.
    ///
    /// `StoreError::InvalidPattern` if the backend cannot compile `pattern`.
    async fn search_by_title(&self, pattern: &str) -> Result<Vec<Recipe>, StoreError>;
}

/// Per-user favorites persistence.
///
/// There is no optimistic concurrency: `upsert` overwrites the whole list, so
/// two racing read-modify-write cycles for the same user keep the last write.
#[async_trait]
pub trait UserFavoritesStore: Send + Sync {
    /// Load a user's favorites. `StoreError::NotFound` if the user has none yet.
    async fn get(&self, user_id: &UserId) -> Result<UserFavorites, StoreError>;

    /// Replace the full favorites list for `favorites.user_id`.
    async fn upsert(&self, favorites: &UserFavorites) -> Result<(), StoreError>;

    /// Create the record for a user's first favorite.
    /// `StoreError::AlreadyExists` if one is already present.
    async fn create(&self, favorites: &UserFavorites) -> Result<(), StoreError>;
}

/// Run a store operation with an upper bound on its duration.
///
/// When the bound elapses the inner future is dropped, which cancels any
/// in-flight query.
///
/// # Errors
///
/// Returns `StoreError::Timeout` if `limit` elapses, otherwise the
/// operation's own result.
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `StoreError::AlreadyExists`.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::AlreadyExists;
    }
    StoreError::Database(err)
}

/// `PostgreSQL` SQLSTATE for a regular expression it cannot compile.
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

/// Map a rejected regular expression to `StoreError::InvalidPattern`.
pub(crate) fn map_invalid_pattern(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.code().as_deref() == Some(INVALID_REGULAR_EXPRESSION)
    {
        return StoreError::InvalidPattern(db_err.message().to_string());
    }
    StoreError::Database(err)
}
