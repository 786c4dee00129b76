//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tr-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `RECIPES_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! `crates/api/migrations/`, embedded at compile time:
//! ```text
//! migrations/
//! ├── 20260101000001_create_recipes.sql
//! └── 20260101000002_create_user_favorites.sql
//! ```

use thiserror::Error;

use table_recipes_api::db;

use super::{DATABASE_URL_VAR, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the recipes database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the database is
/// unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url().ok_or(MigrationError::MissingEnvVar(DATABASE_URL_VAR))?;

    tracing::info!("Connecting to recipes database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running recipes migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Recipes migrations complete!");
    Ok(())
}
