use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{subscription, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::handlers::user::find_user;
use crate::models::shared::{Page, PageRequest};
use crate::models::user::{SubscriptionQuery, UserWithRecipesResponse, parse_recipes_limit};
use crate::state::AppState;
use crate::utils::users::load_authors_with_recipes;

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "Subscriptions",
    operation_id = "listSubscriptions",
    summary = "List followed authors",
    description = "Returns the authors the caller follows, each with `recipes_count` and up to `recipes_limit` recipe cards.",
    params(SubscriptionQuery),
    responses(
        (status = 200, description = "Page of followed authors", body = Page<UserWithRecipesResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query, uri), fields(user_id = auth_user.user_id))]
pub async fn list_subscriptions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SubscriptionQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<UserWithRecipesResponse>>, AppError> {
    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

    let select = user::Entity::find().filter(
        user::Column::Id.in_subquery(
            SeaQuery::select()
                .column(subscription::Column::AuthorId)
                .from(subscription::Entity)
                .and_where(subscription::Column::UserId.eq(auth_user.user_id))
                .to_owned(),
        ),
    );

    let total = select
        .clone()
        .paginate(&state.db, page.limit)
        .num_items()
        .await?;

    let authors = select
        .order_by_asc(user::Column::Id)
        .offset(Some(page.offset()))
        .limit(Some(page.limit))
        .all(&state.db)
        .await?;

    let results = load_authors_with_recipes(
        &state.db,
        authors,
        Some(auth_user.user_id),
        recipes_limit,
        &state.config.media.base_url,
    )
    .await?;

    Ok(Json(page.into_page(results, total, &uri)))
}

#[utoipa::path(
    post,
    path = "/{id}/subscribe",
    tag = "Subscriptions",
    operation_id = "subscribe",
    summary = "Follow an author",
    params(
        ("id" = i32, Path, description = "Author ID"),
        SubscriptionQuery,
    ),
    responses(
        (status = 201, description = "Subscribed", body = UserWithRecipesResponse),
        (status = 400, description = "Self-subscription or already subscribed (SELF_SUBSCRIPTION, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Author not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id, author_id))]
pub async fn subscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
    AppQuery(query): AppQuery<SubscriptionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let author = find_user(&state.db, author_id).await?;
    if author.id == auth_user.user_id {
        return Err(AppError::SelfSubscription);
    }

    let row = subscription::ActiveModel {
        user_id: Set(auth_user.user_id),
        author_id: Set(author.id),
        created_at: Set(chrono::Utc::now()),
    };
    subscription::Entity::insert(row)
        .exec_without_returning(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Already subscribed to this author".into())
            }
            _ => AppError::from(e),
        })?;

    let mut cards = load_authors_with_recipes(
        &state.db,
        vec![author],
        Some(auth_user.user_id),
        parse_recipes_limit(query.recipes_limit.as_deref()),
        &state.config.media.base_url,
    )
    .await?;
    let card = cards
        .pop()
        .ok_or_else(|| AppError::Internal("subscription card missing".into()))?;

    tracing::info!(author_id, "Subscribed");
    Ok((StatusCode::CREATED, Json(card)))
}

#[utoipa::path(
    delete,
    path = "/{id}/subscribe",
    tag = "Subscriptions",
    operation_id = "unsubscribe",
    summary = "Unfollow an author",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Self-subscription or not subscribed (SELF_SUBSCRIPTION, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Author not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, author_id))]
pub async fn unsubscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let author = find_user(&state.db, author_id).await?;
    if author.id == auth_user.user_id {
        return Err(AppError::SelfSubscription);
    }

    let result = subscription::Entity::delete_many()
        .filter(subscription::Column::UserId.eq(auth_user.user_id))
        .filter(subscription::Column::AuthorId.eq(author.id))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::Conflict("Not subscribed to this author".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}
