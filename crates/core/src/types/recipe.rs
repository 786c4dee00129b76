//! Recipe catalog types.

use serde::{Deserialize, Serialize};

use super::id::{RecipeId, UserId};

/// Errors that can occur when validating a [`NewRecipe`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    /// The title is empty or only whitespace.
    #[error("recipe title cannot be empty")]
    EmptyTitle,
    /// No author was provided.
    #[error("recipe author is required")]
    MissingAuthor,
}

/// A recipe as stored in the catalog.
///
/// Serialized with the camelCase field names clients already consume
/// (`authorId`, `imageLinks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Opaque, server-generated id.
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Subject of the user who wrote the recipe.
    pub author_id: UserId,
    #[serde(default)]
    pub image_links: String,
}

/// Payload for creating a recipe. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default = "empty_user_id")]
    pub author_id: UserId,
    #[serde(default)]
    pub image_links: String,
}

fn empty_user_id() -> UserId {
    UserId::new("")
}

impl NewRecipe {
    /// Check the fields every stored recipe must carry.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::EmptyTitle` if the title is blank and
    /// `RecipeError::MissingAuthor` if no author id was given.
    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.title.trim().is_empty() {
            return Err(RecipeError::EmptyTitle);
        }
        if self.author_id.is_blank() {
            return Err(RecipeError::MissingAuthor);
        }
        Ok(())
    }

    /// Attach an id, producing the stored form.
    #[must_use]
    pub fn into_recipe(self, id: RecipeId) -> Recipe {
        Recipe {
            id,
            title: self.title,
            ingredients: self.ingredients,
            instructions: self.instructions,
            author_id: self.author_id,
            image_links: self.image_links,
        }
    }
}

/// Body of a title search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Case-insensitive pattern matched against recipe titles.
    pub search_term: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pancakes() -> NewRecipe {
        NewRecipe {
            title: "Buttermilk Pancakes".to_string(),
            ingredients: vec!["2 cups flour".to_string(), "2 eggs".to_string()],
            instructions: vec!["Whisk".to_string(), "Fry".to_string()],
            author_id: UserId::new("u1"),
            image_links: String::new(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_recipe() {
        assert!(pancakes().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let recipe = NewRecipe {
            title: "   ".to_string(),
            ..pancakes()
        };
        assert_eq!(recipe.validate(), Err(RecipeError::EmptyTitle));
    }

    #[test]
    fn test_validate_rejects_missing_author() {
        let json = r#"{"title": "Soup", "ingredients": ["water"]}"#;
        let recipe: NewRecipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.validate(), Err(RecipeError::MissingAuthor));
    }

    #[test]
    fn test_recipe_uses_camel_case_fields() {
        let recipe = pancakes().into_recipe(RecipeId::new("r1"));
        let value = serde_json::to_value(&recipe).unwrap();

        assert_eq!(value["id"], "r1");
        assert_eq!(value["authorId"], "u1");
        assert_eq!(value["imageLinks"], "");
        assert_eq!(value["ingredients"][1], "2 eggs");
    }

    #[test]
    fn test_search_query_field_name() {
        let query: SearchQuery = serde_json::from_str(r#"{"searchTerm": "pan"}"#).unwrap();
        assert_eq!(query.search_term, "pan");
    }
}
