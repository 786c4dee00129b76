//! Per-user favorite recipe sets.

use serde::{Deserialize, Serialize};

use super::id::{RecipeId, UserId};

/// A user's favorite recipes.
///
/// Membership is set-like (no duplicates); the vector keeps insertion order
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFavorites {
    pub user_id: UserId,
    #[serde(default)]
    pub favorite_recipe_ids: Vec<RecipeId>,
}

impl UserFavorites {
    /// An empty favorites record for `user_id`.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            favorite_recipe_ids: Vec::new(),
        }
    }

    /// Build a record from stored ids, dropping any duplicates while keeping
    /// the first occurrence.
    #[must_use]
    pub fn from_ids(user_id: UserId, ids: impl IntoIterator<Item = RecipeId>) -> Self {
        let mut favorites = Self::empty(user_id);
        for id in ids {
            favorites.add(id);
        }
        favorites
    }

    /// Whether `recipe_id` is already a favorite.
    #[must_use]
    pub fn contains(&self, recipe_id: &RecipeId) -> bool {
        self.favorite_recipe_ids.contains(recipe_id)
    }

    /// Append `recipe_id` unless present. Returns `true` if the set changed.
    pub fn add(&mut self, recipe_id: RecipeId) -> bool {
        if self.contains(&recipe_id) {
            return false;
        }
        self.favorite_recipe_ids.push(recipe_id);
        true
    }

    /// Drop `recipe_id` if present. Returns `true` if the set changed.
    pub fn remove(&mut self, recipe_id: &RecipeId) -> bool {
        match self.favorite_recipe_ids.iter().position(|id| id == recipe_id) {
            Some(index) => {
                self.favorite_recipe_ids.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn ids(&self) -> &[RecipeId] {
        &self.favorite_recipe_ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.favorite_recipe_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorite_recipe_ids.is_empty()
    }
}

/// Request body for adding or removing a favorite.
///
/// The intent is explicit; it is never inferred from current membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    pub recipe_id: RecipeId,
    pub is_adding_favorite: bool,
}
