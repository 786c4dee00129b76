//! Integration tests for the `PostgreSQL` stores.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `RECIPES_DATABASE_URL` (or `DATABASE_URL`). Migrations are applied on
//! connect. Every test works on freshly generated ids, so runs never collide.
//!
//! Run with: cargo test -p table-recipes-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;
use uuid::Uuid;

use table_recipes_api::db::{
    PgFavoritesStore, PgRecipeStore, RecipeStore, StoreError, UserFavoritesStore,
};
use table_recipes_core::{RecipeId, UserFavorites, UserId};
use table_recipes_integration_tests::recipe;

async fn pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("RECIPES_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("RECIPES_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!("../api/migrations").run(&pool).await.unwrap();
    pool
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn favorites(user: &UserId, ids: &[&RecipeId]) -> UserFavorites {
    UserFavorites::from_ids(user.clone(), ids.iter().map(|id| (*id).clone()))
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
#[ignore = "Requires database"]
async fn test_get_unknown_user_is_not_found() {
    let store = PgFavoritesStore::new(pool().await);

    let result = store.get(&UserId::new(unique("nobody"))).await;
    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_second_create_already_exists() {
    let store = PgFavoritesStore::new(pool().await);
    let user = UserId::new(unique("user"));
    let first = RecipeId::new(unique("recipe"));

    store.create(&favorites(&user, &[&first])).await.unwrap();
    let again = store
        .create(&favorites(&user, &[&RecipeId::new(unique("recipe"))]))
        .await;
    assert!(matches!(again, Err(StoreError::AlreadyExists)));

    // The losing create leaves the original record in place.
    assert_eq!(store.get(&user).await.unwrap(), favorites(&user, &[&first]));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_upsert_replaces_list_in_order() {
    let store = PgFavoritesStore::new(pool().await);
    let user = UserId::new(unique("user"));
    let (a, b, c) = (
        RecipeId::new(unique("c")),
        RecipeId::new(unique("a")),
        RecipeId::new(unique("b")),
    );

    store.create(&favorites(&user, &[&a])).await.unwrap();
    store.upsert(&favorites(&user, &[&a, &b, &c])).await.unwrap();
    assert_eq!(
        store.get(&user).await.unwrap(),
        favorites(&user, &[&a, &b, &c])
    );

    store.upsert(&favorites(&user, &[&c, &a])).await.unwrap();
    assert_eq!(store.get(&user).await.unwrap(), favorites(&user, &[&c, &a]));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_upsert_creates_missing_record() {
    let store = PgFavoritesStore::new(pool().await);
    let user = UserId::new(unique("user"));
    let id = RecipeId::new(unique("recipe"));

    store.upsert(&favorites(&user, &[&id])).await.unwrap();
    assert_eq!(store.get(&user).await.unwrap(), favorites(&user, &[&id]));
}

// =============================================================================
// Recipes
// =============================================================================

#[tokio::test]
#[ignore = "Requires database"]
async fn test_insert_round_trip_and_duplicate() {
    let store = PgRecipeStore::new(pool().await);
    let id = unique("recipe");
    let mut soup = recipe(&id, "Tomato Soup", "u1");
    soup.ingredients = vec!["tomatoes".to_string(), "salt".to_string(), "basil".to_string()];

    store.insert(&soup).await.unwrap();
    assert_eq!(store.find_by_id(&soup.id).await.unwrap(), Some(soup.clone()));

    let clash = recipe(&id, "Other", "u2");
    assert!(matches!(
        store.insert(&clash).await,
        Err(StoreError::AlreadyExists)
    ));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_find_by_ids_skips_unknown() {
    let store = PgRecipeStore::new(pool().await);
    let known = recipe(&unique("recipe"), "Beef Stew", "u1");
    store.insert(&known).await.unwrap();

    let found = store
        .find_by_ids(&[RecipeId::new(unique("ghost")), known.id.clone()])
        .await
        .unwrap();
    assert_eq!(found, vec![known]);

    assert!(store.find_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_delete_reports_removal() {
    let store = PgRecipeStore::new(pool().await);
    let doomed = recipe(&unique("recipe"), "Lemon Tart", "u1");
    store.insert(&doomed).await.unwrap();

    assert!(store.delete(&doomed.id).await.unwrap());
    assert!(!store.delete(&doomed.id).await.unwrap());
    assert_eq!(store.find_by_id(&doomed.id).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_search_rejects_pattern_postgres_cannot_compile() {
    let store = PgRecipeStore::new(pool().await);

    let result = store.search_by_title("(?P<n>soup)").await;
    assert!(matches!(result, Err(StoreError::InvalidPattern(_))));
}
