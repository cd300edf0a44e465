use axum::{Json, extract::State, http::StatusCode};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, TokenResponse, validate_login_request};
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// Check `password` against a stored hash off the async runtime.
pub(crate) async fn check_password(password: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || hash::verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("Password verify task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))
}

#[utoipa::path(
    post,
    path = "/token/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Obtain an auth token",
    description = "Exchanges e-mail and password for a token to send as `Authorization: Token <auth_token>`.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Bad credentials (INVALID_CREDENTIALS, VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim();

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !check_password(payload.password, user.password.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let auth_token = jwt::sign(
        user.id,
        &user.email,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse { auth_token }))
}

#[utoipa::path(
    post,
    path = "/token/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Log out",
    description = "Tokens are stateless; the client discards its token. Requires a valid token.",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn logout(auth_user: AuthUser) -> StatusCode {
    StatusCode::NO_CONTENT
}
