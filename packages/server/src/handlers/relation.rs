//! Favorite and shopping-cart toggles.
//!
//! Both relations are keyed by `(user_id, recipe_id)`; the primary key is the
//! only duplicate check, so concurrent toggles resolve in the database.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{favorite, shopping_cart};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::recipe::find_recipe;
use crate::models::recipe::RecipeMinified;
use crate::state::AppState;

fn conflict_on_duplicate(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.into()),
        _ => AppError::from(err),
    }
}

#[utoipa::path(
    post,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "addFavorite",
    summary = "Add a recipe to favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = RecipeMinified),
        (status = 400, description = "Already in favorites (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn add_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    let row = favorite::ActiveModel {
        user_id: Set(auth_user.user_id),
        recipe_id: Set(recipe.id),
        created_at: Set(chrono::Utc::now()),
    };
    favorite::Entity::insert(row)
        .exec_without_returning(&state.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Recipe is already in favorites"))?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeMinified::new(&recipe, &state.config.media.base_url)),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "removeFavorite",
    summary = "Remove a recipe from favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Not in favorites (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn remove_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    let result = favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(auth_user.user_id))
        .filter(favorite::Column::RecipeId.eq(recipe.id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::Conflict("Recipe is not in favorites".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "addToShoppingCart",
    summary = "Add a recipe to the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = RecipeMinified),
        (status = 400, description = "Already in the cart (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn add_to_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    let row = shopping_cart::ActiveModel {
        user_id: Set(auth_user.user_id),
        recipe_id: Set(recipe.id),
        created_at: Set(chrono::Utc::now()),
    };
    shopping_cart::Entity::insert(row)
        .exec_without_returning(&state.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Recipe is already in the shopping cart"))?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeMinified::new(&recipe, &state.config.media.base_url)),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "removeFromShoppingCart",
    summary = "Remove a recipe from the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Not in the cart (CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn remove_from_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    let result = shopping_cart::Entity::delete_many()
        .filter(shopping_cart::Column::UserId.eq(auth_user.user_id))
        .filter(shopping_cart::Column::RecipeId.eq(recipe.id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::Conflict("Recipe is not in the shopping cart".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
