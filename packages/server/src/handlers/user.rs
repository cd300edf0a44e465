use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::handlers::auth::check_password;
use crate::models::auth::{SetPasswordRequest, validate_password};
use crate::models::shared::{Page, PageQuery, PageRequest};
use crate::models::user::{
    AvatarRequest, AvatarResponse, RegisterRequest, RegisterResponse, UserResponse,
    validate_register_request,
};
use crate::state::AppState;
use crate::utils::hash;
use crate::utils::media::{
    attach_image, decode_image, finish_with_image, media_url, release_image,
};
use crate::utils::users::{load_user_response, load_user_responses};

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new user",
    description = "Creates an account. E-mail and username must be unique.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Validation error or taken e-mail/username (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hash task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        email: Set(payload.email.trim().to_string()),
        username: Set(payload.username.trim().to_string()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        password: Set(password_hash),
        avatar: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A user with this email or username already exists".into())
        }
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users", body = Page<UserResponse>),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer, query, uri))]
pub async fn list_users(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<UserResponse>>, AppError> {
    let page = PageRequest::new(query.page, query.limit, &state.config.pagination);

    let select = user::Entity::find();
    let total = select
        .clone()
        .paginate(&state.db, page.limit)
        .num_items()
        .await?;

    let users = select
        .order_by_asc(user::Column::Id)
        .offset(Some(page.offset()))
        .limit(Some(page.limit))
        .all(&state.db)
        .await?;

    let results =
        load_user_responses(&state.db, users, viewer.user_id(), &state.config.media.base_url)
            .await?;
    Ok(Json(page.into_page(results, total, &uri)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user profile",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_user(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, id).await?;
    let response =
        load_user_response(&state.db, user, viewer.user_id(), &state.config.media.base_url)
            .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the current user's profile",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_current_user(&state.db, &auth_user).await?;
    Ok(Json(UserResponse::new(
        user,
        false,
        &state.config.media.base_url,
    )))
}

#[utoipa::path(
    post,
    path = "/set_password",
    tag = "Users",
    operation_id = "setPassword",
    summary = "Change the current user's password",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new one (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn set_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let user = find_current_user(&state.db, &auth_user).await?;

    if !check_password(payload.current_password, user.password.clone()).await? {
        return Err(AppError::field("current_password", "Current password is incorrect"));
    }
    validate_password("new_password", &payload.new_password, &user.username, &user.email)?;

    let new_password = payload.new_password;
    let password_hash = tokio::task::spawn_blocking(move || hash::hash_password(&new_password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hash task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: user::ActiveModel = user.into();
    active.password = Set(password_hash);
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/me/avatar",
    tag = "Users",
    operation_id = "setAvatar",
    summary = "Upload an avatar",
    description = "Replaces the current user's avatar with a base64 data-URI image.",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Missing or invalid image (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn set_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AvatarRequest>,
) -> Result<Json<AvatarResponse>, AppError> {
    let data_uri = payload
        .avatar
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| AppError::field("avatar", "Avatar must not be empty"))?;

    let image = decode_image(&data_uri, "avatar")?;

    let txn = state.db.begin().await?;
    let key = attach_image(&txn, state.media.as_ref(), &image).await?;

    let outcome = async {
        let user = find_current_user(&txn, &auth_user).await?;
        let previous = user.avatar.clone();
        let mut active: user::ActiveModel = user.into();
        active.avatar = Set(Some(key.clone()));
        active.update(&txn).await?;
        Ok::<_, AppError>(previous)
    }
    .await;
    let previous = finish_with_image(
        txn,
        outcome,
        &state.db,
        state.media.as_ref(),
        Some(key.as_str()),
    )
    .await?;

    if let Some(old) = previous.filter(|old| *old != key) {
        release_image(&state.db, state.media.as_ref(), &old).await?;
    }

    Ok(Json(AvatarResponse {
        avatar: media_url(&state.config.media.base_url, &key),
    }))
}

#[utoipa::path(
    delete,
    path = "/me/avatar",
    tag = "Users",
    operation_id = "deleteAvatar",
    summary = "Remove the avatar",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_avatar(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = find_current_user(&state.db, &auth_user).await?;
    if let Some(old) = user.avatar.clone() {
        let mut active: user::ActiveModel = user.into();
        active.avatar = Set(None);
        active.update(&state.db).await?;
        release_image(&state.db, state.media.as_ref(), &old).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// The caller's account. A token outliving its account is treated as invalid.
pub(crate) async fn find_current_user<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(auth_user.user_id)
        .one(db)
        .await?
        .ok_or(AppError::TokenInvalid)
}
