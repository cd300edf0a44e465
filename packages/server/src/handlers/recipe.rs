use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{favorite, recipe, recipe_ingredient, recipe_tag, shopping_cart, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::recipe::*;
use crate::models::shared::{Page, PageRequest, parse_flag};
use crate::state::AppState;
use crate::utils::media::{attach_image, decode_image, finish_with_image, release_image};
use crate::utils::recipes::{
    ensure_ingredients_exist, ensure_tags_exist, insert_with_short_link, load_recipe_response,
    load_recipe_responses, replace_recipe_links,
};
use crate::utils::short_link;

#[utoipa::path(
    get,
    path = "/",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes",
    description = "Paginated recipe list ordered by publication date, then name. Filters combine: `author`, any of the repeated `tags` slugs, and the caller's `is_favorited` / `is_in_shopping_cart` relations (anonymous callers get an empty page for those).",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Page of recipes", body = Page<RecipeResponse>),
        (status = 400, description = "Malformed query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query, uri))]
pub async fn list_recipes(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RecipeListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<RecipeResponse>>, AppError> {
    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);
    let viewer_id = viewer.user_id();

    let mut select = recipe::Entity::find();

    if let Some(author) = query.author {
        select = select.filter(recipe::Column::AuthorId.eq(author));
    }

    let slugs: Vec<String> = query
        .tags
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if !slugs.is_empty() {
        select = select.filter(
            recipe::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(recipe_tag::Column::RecipeId)
                    .from(recipe_tag::Entity)
                    .and_where(
                        recipe_tag::Column::TagId.in_subquery(
                            SeaQuery::select()
                                .column(tag::Column::Id)
                                .from(tag::Entity)
                                .and_where(tag::Column::Slug.is_in(slugs))
                                .to_owned(),
                        ),
                    )
                    .to_owned(),
            ),
        );
    }

    let only_favorited = parse_flag(query.is_favorited.as_deref());
    let only_in_cart = parse_flag(query.is_in_shopping_cart.as_deref());
    if (only_favorited || only_in_cart) && viewer_id.is_none() {
        return Ok(Json(page.into_page(Vec::new(), 0, &uri)));
    }
    if let Some(uid) = viewer_id {
        if only_favorited {
            select = select.filter(
                recipe::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(favorite::Column::RecipeId)
                        .from(favorite::Entity)
                        .and_where(favorite::Column::UserId.eq(uid))
                        .to_owned(),
                ),
            );
        }
        if only_in_cart {
            select = select.filter(
                recipe::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(shopping_cart::Column::RecipeId)
                        .from(shopping_cart::Entity)
                        .and_where(shopping_cart::Column::UserId.eq(uid))
                        .to_owned(),
                ),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, page.limit)
        .num_items()
        .await?;

    let recipes = select
        .order_by_asc(recipe::Column::PubDate)
        .order_by_asc(recipe::Column::Name)
        .order_by_asc(recipe::Column::Id)
        .offset(Some(page.offset()))
        .limit(Some(page.limit))
        .all(&state.db)
        .await?;

    let results =
        load_recipe_responses(&state.db, recipes, viewer_id, &state.config.media.base_url).await?;
    Ok(Json(page.into_page(results, total, &uri)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Publish a recipe",
    description = "Creates a recipe authored by the caller. Needs at least one tag and one ingredient, without duplicates. A unique short link is assigned.",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, name = %payload.name))]
pub async fn create_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_recipe(&payload)?;
    ensure_tags_exist(&state.db, &payload.tags).await?;
    ensure_ingredients_exist(&state.db, &payload.ingredients).await?;

    let decoded = decode_image(&payload.image, "image")?;

    let txn = state.db.begin().await?;
    let image = attach_image(&txn, state.media.as_ref(), &decoded).await?;

    let new_recipe = recipe::ActiveModel {
        author_id: Set(auth_user.user_id),
        name: Set(payload.name.trim().to_string()),
        image: Set(image.clone()),
        text: Set(payload.text),
        cooking_time: Set(payload.cooking_time),
        pub_date: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let outcome = async {
        let created = insert_with_short_link(&txn, new_recipe).await?;
        replace_recipe_links(&txn, created.id, &payload.tags, &payload.ingredients).await?;
        Ok::<_, AppError>(created)
    }
    .await;
    let created = finish_with_image(
        txn,
        outcome,
        &state.db,
        state.media.as_ref(),
        Some(image.as_str()),
    )
    .await?;

    tracing::info!(recipe_id = created.id, "Recipe created");
    let response = load_recipe_response(
        &state.db,
        created,
        Some(auth_user.user_id),
        &state.config.media.base_url,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_recipe(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = find_recipe(&state.db, id).await?;
    let response = load_recipe_response(
        &state.db,
        recipe,
        viewer.user_id(),
        &state.config.media.base_url,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Update a recipe",
    description = "Author only. `tags` and `ingredients` are required and replace the current sets; other fields are optional, and an omitted `image` keeps the current picture.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, id))]
pub async fn update_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let existing = find_recipe(&state.db, id).await?;
    auth_user.require_owner(existing.author_id)?;

    validate_update_recipe(&payload)?;
    let tags = payload.tags.unwrap_or_default();
    let ingredients = payload.ingredients.unwrap_or_default();
    ensure_tags_exist(&state.db, &tags).await?;
    ensure_ingredients_exist(&state.db, &ingredients).await?;

    let decoded = payload
        .image
        .as_deref()
        .map(|data_uri| decode_image(data_uri, "image"))
        .transpose()?;

    let txn = state.db.begin().await?;
    let new_image = match decoded {
        Some(ref image) => Some(attach_image(&txn, state.media.as_ref(), image).await?),
        None => None,
    };

    let outcome = async {
        let current = find_recipe_for_update(&txn, id).await?;
        let old_image = current.image.clone();
        let mut active: recipe::ActiveModel = current.into();
        if let Some(name) = payload.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(text) = payload.text {
            active.text = Set(text);
        }
        if let Some(cooking_time) = payload.cooking_time {
            active.cooking_time = Set(cooking_time);
        }
        if let Some(ref image) = new_image {
            active.image = Set(image.clone());
        }
        let updated = active.update(&txn).await?;
        replace_recipe_links(&txn, id, &tags, &ingredients).await?;
        Ok::<_, AppError>((updated, old_image))
    }
    .await;
    let (updated, old_image) = finish_with_image(
        txn,
        outcome,
        &state.db,
        state.media.as_ref(),
        new_image.as_deref(),
    )
    .await?;

    if new_image.is_some_and(|img| img != old_image) {
        release_image(&state.db, state.media.as_ref(), &old_image).await?;
    }

    let response = load_recipe_response(
        &state.db,
        updated,
        Some(auth_user.user_id),
        &state.config.media.base_url,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Author only. Also removes the recipe from every favorites list and shopping cart.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn delete_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let txn = state.db.begin().await?;

    let recipe = find_recipe_for_update(&txn, id).await?;
    auth_user.require_owner(recipe.author_id)?;

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    favorite::Entity::delete_many()
        .filter(favorite::Column::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    shopping_cart::Entity::delete_many()
        .filter(shopping_cart::Column::RecipeId.eq(id))
        .exec(&txn)
        .await?;
    recipe::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    release_image(&state.db, state.media.as_ref(), &recipe.image).await?;

    tracing::info!("Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/get-link",
    tag = "Recipes",
    operation_id = "getRecipeShortLink",
    summary = "Get a recipe's short link",
    description = "Returns an absolute `/s/{token}/` URL built from `server.public_url`, or from the request `Host` when that is not configured.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(id))]
pub async fn get_short_link(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<ShortLinkResponse>, AppError> {
    let recipe = find_recipe(&state.db, id).await?;

    let base = match state.config.server.public_url {
        Some(ref url) => url.clone(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };

    Ok(Json(ShortLinkResponse {
        short_link: short_link::absolute_url(&base, &recipe.short_link),
    }))
}

#[utoipa::path(
    get,
    path = "/s/{token}",
    tag = "Recipes",
    operation_id = "getRecipeByShortLink",
    summary = "Resolve a short link to a recipe",
    params(("token" = String, Path, description = "Short-link token (case-insensitive)")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Unknown short link (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer), fields(token))]
pub async fn get_recipe_by_short_link(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = find_recipe_by_short_link(&state.db, &token).await?;
    let response = load_recipe_response(
        &state.db,
        recipe,
        viewer.user_id(),
        &state.config.media.base_url,
    )
    .await?;
    Ok(Json(response))
}

pub(crate) async fn find_recipe<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

async fn find_recipe_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<recipe::Model, AppError> {
    use sea_orm::sea_query::LockType;
    recipe::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

pub(crate) async fn find_recipe_by_short_link<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<recipe::Model, AppError> {
    let not_found = || AppError::NotFound("Short link not found".into());
    let token = short_link::normalize(token).ok_or_else(not_found)?;
    recipe::Entity::find()
        .filter(recipe::Column::ShortLink.eq(token))
        .one(db)
        .await?
        .ok_or_else(not_found)
}
