//! `tr-cli` subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Variable holding the recipes database connection string.
pub const DATABASE_URL_VAR: &str = "RECIPES_DATABASE_URL";

/// Read the database URL, falling back to the generic `DATABASE_URL`.
///
/// Loads `.env` first if present.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
}
