//! HTTP handlers for recipe endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Recipe, RecipeInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::RecipeService;
use crate::AppState;

/// List the caller's recipes
pub async fn list_recipes(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Recipe>>> {
    let service = RecipeService::new(state.db);
    let recipes = service.list(current_user.0.user_id).await?;
    Ok(Json(recipes))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Json<Recipe>> {
    let service = RecipeService::new(state.db);
    let recipe = service.get(current_user.0.user_id, recipe_id).await?;
    Ok(Json(recipe))
}

/// Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecipeInput>,
) -> AppResult<(StatusCode, Json<Recipe>)> {
    let service = RecipeService::new(state.db);
    let recipe = service.create(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Update a recipe
pub async fn update_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<Recipe>> {
    let service = RecipeService::new(state.db);
    let recipe = service
        .update(current_user.0.user_id, recipe_id, input)
        .await?;
    Ok(Json(recipe))
}

/// Delete a recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = RecipeService::new(state.db);
    service.delete(current_user.0.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
