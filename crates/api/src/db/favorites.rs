//! `PostgreSQL` per-user favorites.
//!
//! One row per user. The favorite ids are a `TEXT[]` kept in insertion order;
//! writes always replace the whole array.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use table_recipes_core::{RecipeId, UserFavorites, UserId};

use super::{StoreError, UserFavoritesStore, map_unique_violation};

#[derive(Debug, sqlx::FromRow)]
struct FavoritesRow {
    user_id: UserId,
    favorite_recipe_ids: Vec<String>,
}

impl From<FavoritesRow> for UserFavorites {
    fn from(row: FavoritesRow) -> Self {
        Self::from_ids(
            row.user_id,
            row.favorite_recipe_ids.into_iter().map(RecipeId::from),
        )
    }
}

fn id_array(favorites: &UserFavorites) -> Vec<String> {
    favorites
        .ids()
        .iter()
        .map(|id| id.as_str().to_owned())
        .collect()
}

/// Favorites store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgFavoritesStore {
    pool: PgPool,
}

impl PgFavoritesStore {
    /// Create a new favorites store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserFavoritesStore for PgFavoritesStore {
    #[instrument(skip_all, fields(user_id = %user_id))]
    async fn get(&self, user_id: &UserId) -> Result<UserFavorites, StoreError> {
        let row: Option<FavoritesRow> = sqlx::query_as(
            r"
            SELECT user_id, favorite_recipe_ids
            FROM recipes.user_favorites
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserFavorites::from).ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self, favorites), fields(user_id = %favorites.user_id, count = favorites.len()))]
    async fn upsert(&self, favorites: &UserFavorites) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO recipes.user_favorites (user_id, favorite_recipe_ids)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
                SET favorite_recipe_ids = EXCLUDED.favorite_recipe_ids,
                    updated_at = now()
            ",
        )
        .bind(&favorites.user_id)
        .bind(id_array(favorites))
        .execute(&self.pool)
        .await?;

        debug!("Replaced favorites");
        Ok(())
    }

    #[instrument(skip(self, favorites), fields(user_id = %favorites.user_id))]
    async fn create(&self, favorites: &UserFavorites) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO recipes.user_favorites (user_id, favorite_recipe_ids)
            VALUES ($1, $2)
            ",
        )
        .bind(&favorites.user_id)
        .bind(id_array(favorites))
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        debug!("Created favorites record");
        Ok(())
    }
}
