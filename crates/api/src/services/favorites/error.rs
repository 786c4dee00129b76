//! Favorites service error types.

use thiserror::Error;

use table_recipes_core::RecipeId;

use crate::db::StoreError;

/// Errors that can occur when adding or removing a favorite.
#[derive(Debug, Error)]
pub enum ToggleError {
    /// The requester may only change their own favorites.
    #[error("forbidden")]
    Forbidden,

    /// The recipe being added does not exist.
    #[error("recipe not found: {0}")]
    RecipeNotFound(RecipeId),

    /// Reading or writing the favorites failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Errors that can occur when listing a user's favorite recipes.
#[derive(Debug, Error)]
pub enum ListError {
    /// The requester may only read their own favorites.
    #[error("forbidden")]
    Forbidden,

    /// Reading the favorites or recipes failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}
