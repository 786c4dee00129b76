//! Seed the recipe catalog from a YAML file.
//!
//! The file is a list of recipes using the API's field names. An explicit
//! `id` is optional; entries without one get a generated id.
//!
//! ```yaml
//! - id: 65a1f0c2b4d3e5f6a7b8c9d0
//!   title: Tomato Soup
//!   authorId: f47ac10b-58cc-4372-a567-0e02b2c3d479
//!   ingredients: [tomatoes, stock, basil]
//!   instructions: [Simmer, Blend]
//!   imageLinks: https://example.com/soup.jpg
//! ```
//!
//! Entries whose id already exists are skipped, so seeding is repeatable.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use table_recipes_api::db::{self, PgRecipeStore, RecipeStore, StoreError};
use table_recipes_api::db::recipes::generate_recipe_id;
use table_recipes_core::{NewRecipe, RecipeError, RecipeId};

use super::{DATABASE_URL_VAR, database_url};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Entry {index} is invalid: {source}")]
    Invalid { index: usize, source: RecipeError },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// One recipe in a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedRecipe {
    #[serde(default)]
    pub id: Option<RecipeId>,
    #[serde(flatten)]
    pub recipe: NewRecipe,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Parse and validate a seed file's contents.
///
/// # Errors
///
/// Returns `SeedError::Parse` for malformed YAML and `SeedError::Invalid`
/// for the first entry that fails recipe validation.
pub fn parse(content: &str) -> Result<Vec<SeedRecipe>, SeedError> {
    let entries: Vec<SeedRecipe> = serde_yaml::from_str(content)?;
    for (index, entry) in entries.iter().enumerate() {
        entry
            .recipe
            .validate()
            .map_err(|source| SeedError::Invalid { index, source })?;
    }
    Ok(entries)
}

/// Insert `entries`, skipping any whose id is already taken.
///
/// # Errors
///
/// Returns the first store failure other than a duplicate id.
pub async fn insert_all(
    store: &dyn RecipeStore,
    entries: Vec<SeedRecipe>,
) -> Result<SeedSummary, StoreError> {
    let mut summary = SeedSummary::default();

    for entry in entries {
        let id = entry.id.unwrap_or_else(generate_recipe_id);
        if store.find_by_id(&id).await?.is_some() {
            summary.skipped += 1;
            continue;
        }

        match store.insert(&entry.recipe.into_recipe(id)).await {
            Ok(()) => summary.inserted += 1,
            Err(StoreError::AlreadyExists) => summary.skipped += 1,
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Seed recipes from the YAML file at `file_path`.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the file cannot be read
/// or validated, or an insert fails.
pub async fn recipes(file_path: &str) -> Result<(), SeedError> {
    let database_url = database_url().ok_or(SeedError::MissingEnvVar(DATABASE_URL_VAR))?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading recipes from file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let entries = parse(&content).inspect_err(|e| error!("{e}"))?;
    info!(recipes = entries.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let summary = insert_all(&PgRecipeStore::new(pool), entries).await?;

    info!("Seeding complete!");
    info!("  Recipes inserted: {}", summary.inserted);
    info!("  Recipes skipped (already exist): {}", summary.skipped);

    Ok(())
}
