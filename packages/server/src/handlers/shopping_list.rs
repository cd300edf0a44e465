use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{ingredient, recipe_ingredient, shopping_cart};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::user::find_current_user;
use crate::models::recipe::{ShoppingListItem, render_shopping_list, shopping_list_disposition};
use crate::state::AppState;

/// Ingredient totals over every recipe in `user_id`'s cart, ordered by name.
pub async fn aggregate_shopping_list<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<ShoppingListItem>, DbErr> {
    recipe_ingredient::Entity::find()
        .select_only()
        .column(ingredient::Column::Name)
        .column(ingredient::Column::MeasurementUnit)
        .column_as(recipe_ingredient::Column::Amount.sum(), "total")
        .inner_join(ingredient::Entity)
        .filter(
            recipe_ingredient::Column::RecipeId.in_subquery(
                SeaQuery::select()
                    .column(shopping_cart::Column::RecipeId)
                    .from(shopping_cart::Entity)
                    .and_where(shopping_cart::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .group_by(ingredient::Column::Name)
        .group_by(ingredient::Column::MeasurementUnit)
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::MeasurementUnit)
        .into_model::<ShoppingListItem>()
        .all(db)
        .await
}

#[utoipa::path(
    get,
    path = "/download_shopping_cart",
    tag = "Shopping Cart",
    operation_id = "downloadShoppingList",
    summary = "Download the shopping list",
    description = "Sums ingredient amounts over every recipe in the caller's cart, grouped by ingredient and unit, and returns them as a plain-text attachment.",
    responses(
        (status = 200, description = "Shopping list", body = String, content_type = "text/plain"),
        (status = 400, description = "Cart is empty (EMPTY_CART)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_shopping_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_current_user(&state.db, &auth_user).await?;

    let items = aggregate_shopping_list(&state.db, user.id).await?;
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let body = render_shopping_list(&user.display_name(), chrono::Utc::now(), &items);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, shopping_list_disposition(&user.username)),
        ],
        body,
    ))
}
