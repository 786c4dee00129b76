//! Core types for Table Recipes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod favorites;
pub mod id;
pub mod identity;
pub mod recipe;

pub use favorites::{FavoriteToggle, UserFavorites};
pub use id::*;
pub use identity::{Identity, IdentityError, UserInfoClaims};
pub use recipe::{NewRecipe, Recipe, RecipeError, SearchQuery};
