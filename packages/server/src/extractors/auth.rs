use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from `Authorization: Token <jwt>`
/// (`Bearer <jwt>` is accepted too).
///
/// Add this as a handler parameter to require authentication.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

impl AuthUser {
    /// Returns `Ok(())` if the caller is `owner_id`, `Err(PermissionDenied)` otherwise.
    pub fn require_owner(&self, owner_id: i32) -> Result<(), AppError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")).then_some(token)
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let auth_header = auth_header.to_str().map_err(|_| AppError::TokenInvalid)?;
    let token = bearer_token(auth_header).ok_or(AppError::TokenInvalid)?;

    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

    Ok(Some(AuthUser {
        user_id: claims.uid,
        email: claims.sub,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)?.ok_or(AppError::TokenMissing)
    }
}

/// Optional authentication for public endpoints.
///
/// No header yields `None`; a malformed or expired token is still rejected.
#[derive(Debug)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(authenticate(parts, state)?))
    }
}
