//! Per-user favorites route handlers.
//!
//! Both routes require a bearer credential whose subject matches `{id}`.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use table_recipes_core::{FavoriteToggle, Recipe, UserFavorites, UserId};

use crate::error::{AppError, Result};
use crate::middleware::RequireIdentity;
use crate::response::ApiResponse;
use crate::state::AppState;

/// The user's favorite recipes.
pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(user_id): Path<UserId>,
) -> Result<ApiResponse<Vec<Recipe>>> {
    let recipes = state
        .favorites()
        .list_favorite_recipes(&identity, &user_id)
        .await?;
    Ok(ApiResponse::ok("Successfully fetched all recipes!", recipes))
}

/// Add or remove one favorite, as directed by `isAddingFavorite`.
pub async fn toggle(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(user_id): Path<UserId>,
    payload: std::result::Result<Json<FavoriteToggle>, JsonRejection>,
) -> Result<ApiResponse<UserFavorites>> {
    let Json(toggle) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let favorites = state
        .favorites()
        .toggle_favorite(
            &identity,
            &user_id,
            &toggle.recipe_id,
            toggle.is_adding_favorite,
        )
        .await?;

    let message = if toggle.is_adding_favorite {
        "Successfully added recipe to user favorites!"
    } else {
        "Successfully removed recipe from user favorites!"
    };
    Ok(ApiResponse::ok(message, favorites))
}
