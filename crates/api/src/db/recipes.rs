//! `PostgreSQL` recipe catalog.

use std::fmt::Write as _;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use table_recipes_core::{Recipe, RecipeId, UserId};

use super::{RecipeStore, StoreError, map_invalid_pattern, map_unique_violation};

const RECIPE_COLUMNS: &str =
    "id, title, ingredients, instructions, author_id, image_links";

/// Row shape of `recipes.recipe`.
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: RecipeId,
    title: String,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    author_id: UserId,
    image_links: String,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            ingredients: row.ingredients,
            instructions: row.instructions,
            author_id: row.author_id,
            image_links: row.image_links,
        }
    }
}

/// Generate a new recipe id: 24 lowercase hex characters.
#[must_use]
pub fn generate_recipe_id() -> RecipeId {
    let bytes: [u8; 12] = rand::random();
    let mut id = String::with_capacity(24);
    for byte in bytes {
        let _ = write!(id, "{byte:02x}");
    }
    RecipeId::new(id)
}

/// Recipe store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    /// Create a new recipe store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, RecipeRow, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Recipe>, StoreError> {
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes.recipe ORDER BY id");
        self.fetch_many(sqlx::query_as(&sql)).await
    }

    #[instrument(skip_all, fields(recipe_id = %id))]
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes.recipe WHERE id = $1");
        let row: Option<RecipeRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Recipe::from))
    }

    #[instrument(skip_all, fields(author_id = %author_id))]
    async fn find_by_author(&self, author_id: &UserId) -> Result<Vec<Recipe>, StoreError> {
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes.recipe WHERE author_id = $1 ORDER BY id"
        );
        self.fetch_many(sqlx::query_as(&sql).bind(author_id)).await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes.recipe WHERE id = ANY($1)");
        let recipes = self.fetch_many(sqlx::query_as(&sql).bind(keys)).await?;

        debug!(found = recipes.len(), "Resolved recipes by id");
        Ok(recipes)
    }

    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id))]
    async fn insert(&self, recipe: &Recipe) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO recipes.recipe
                (id, title, ingredients, instructions, author_id, image_links)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&recipe.id)
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.author_id)
        .bind(&recipe.image_links)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    #[instrument(skip_all, fields(recipe_id = %id))]
    async fn delete(&self, id: &RecipeId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recipes.recipe WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn search_by_title(&self, pattern: &str) -> Result<Vec<Recipe>, StoreError> {
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes.recipe WHERE title ~* $1 ORDER BY id"
        );
        let rows: Vec<RecipeRow> = sqlx::query_as(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(map_invalid_pattern)?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }
}
