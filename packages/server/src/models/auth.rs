use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for obtaining a token.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// E-mail address the account was registered with.
    #[schema(example = "vasya@example.com")]
    pub email: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::field("email", "Email must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(AppError::field("password", "Password must not be empty"));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    /// Token to send as `Authorization: Token <auth_token>`.
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub auth_token: String,
}

/// Request body for changing the caller's password.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetPasswordRequest {
    #[schema(example = "n3w_P@ssword")]
    pub new_password: String,
    #[schema(example = "s3cure_P@ss!")]
    pub current_password: String,
}

/// Password strength rules applied on registration and password change.
/// Errors are reported against `field`.
pub fn validate_password(
    field: &'static str,
    password: &str,
    username: &str,
    email: &str,
) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(8..=128).contains(&len) {
        return Err(AppError::field(field, "Password must be 8-128 characters"));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::field(field, "Password must not be entirely numeric"));
    }

    let lowered = password.to_lowercase();
    let local_part = email.split('@').next().unwrap_or_default();
    if lowered == username.to_lowercase()
        || (!local_part.is_empty() && lowered == local_part.to_lowercase())
    {
        return Err(AppError::field(
            field,
            "Password is too similar to the username or email",
        ));
    }
    Ok(())
}
