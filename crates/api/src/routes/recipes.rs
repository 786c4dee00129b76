//! Recipe catalog route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::{info, instrument};

use table_recipes_core::{NewRecipe, Recipe, RecipeId, SearchQuery};

use crate::db::{bounded, recipes::generate_recipe_id};
use crate::error::{AppError, Result};
use crate::middleware::RequireIdentity;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Result of a delete, in the shape clients already read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// All recipes.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<ApiResponse<Vec<Recipe>>> {
    let recipes = bounded(state.config().store_timeout, state.recipes().find_all()).await?;
    Ok(ApiResponse::ok("Successfully fetched all recipes!", recipes))
}

/// A single recipe.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
) -> Result<ApiResponse<Recipe>> {
    let recipe = bounded(state.config().store_timeout, state.recipes().find_by_id(&id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("recipe {id}")))?;
    Ok(ApiResponse::ok(
        format!("Successfully fetched recipe with ID {id}"),
        recipe,
    ))
}

/// Recipes authored by the caller.
#[instrument(skip_all)]
pub async fn mine(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<ApiResponse<Vec<Recipe>>> {
    let recipes = bounded(
        state.config().store_timeout,
        state.recipes().find_by_author(&identity.subject),
    )
    .await?;
    Ok(ApiResponse::ok(
        format!(
            "Successfully fetched all recipes created by user with ID: {}",
            identity.subject
        ),
        recipes,
    ))
}

/// Create a recipe under a freshly generated id.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewRecipe>, JsonRejection>,
) -> Result<ApiResponse<Recipe>> {
    let Json(new_recipe) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    new_recipe.validate()?;

    let recipe = new_recipe.into_recipe(generate_recipe_id());
    bounded(state.config().store_timeout, state.recipes().insert(&recipe)).await?;

    info!(recipe_id = %recipe.id, author_id = %recipe.author_id, "Created recipe");
    Ok(ApiResponse::created("Successfully created recipe!", recipe))
}

/// Case-insensitive title search.
#[instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchQuery>, JsonRejection>,
) -> Result<ApiResponse<Vec<Recipe>>> {
    let Json(query) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let recipes = bounded(
        state.config().store_timeout,
        state.recipes().search_by_title(&query.search_term),
    )
    .await?;
    Ok(ApiResponse::ok(
        format!(
            "Successfully fetched all recipes with title containing '{}'!",
            query.search_term
        ),
        recipes,
    ))
}

/// Delete a recipe. Deleting an unknown id is not an error.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<RecipeId>,
) -> Result<ApiResponse<DeleteResult>> {
    let deleted = bounded(state.config().store_timeout, state.recipes().delete(&id)).await?;
    if deleted {
        info!(recipe_id = %id, "Deleted recipe");
    }
    Ok(ApiResponse::ok(
        format!("Successfully deleted recipe with ID {id}"),
        DeleteResult {
            deleted_count: u64::from(deleted),
        },
    ))
}
