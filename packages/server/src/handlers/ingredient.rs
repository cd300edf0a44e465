use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::ingredient;
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::ingredient::{IngredientQuery, IngredientResponse, rank_by_prefix};
use crate::models::shared::escape_like;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Ingredients",
    operation_id = "listIngredients",
    summary = "Search ingredients",
    description = "Case-insensitive search by name. Names starting with the query are listed before names that only contain it; each group is ordered by name. Not paginated.",
    params(IngredientQuery),
    responses(
        (status = 200, description = "Matching ingredients", body = Vec<IngredientResponse>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IngredientQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let term = query.name.as_deref().map(str::trim).unwrap_or_default();

    let mut select = ingredient::Entity::find();
    if !term.is_empty() {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(ingredient::Column::Name))).like(
                LikeExpr::new(format!("%{}%", escape_like(&term.to_lowercase()))).escape('\\'),
            ),
        );
    }

    let mut items: Vec<IngredientResponse> = select
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(IngredientResponse::from)
        .collect();

    if !term.is_empty() {
        rank_by_prefix(&mut items, term);
    }
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "getIngredient",
    summary = "Get an ingredient by ID",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = ingredient::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient not found".into()))?;
    Ok(Json(ingredient.into()))
}
