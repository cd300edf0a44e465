use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::auth::validate_password;
use crate::models::recipe::RecipeMinified;
use crate::utils::media::media_url;

use super::shared::validate_length;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique e-mail address used to log in.
    #[schema(example = "vasya@example.com")]
    pub email: String,
    /// Unique username (letters, digits and `.@+-_`).
    #[schema(example = "vasya.pupkin")]
    pub username: String,
    #[schema(example = "Вася")]
    pub first_name: String,
    #[schema(example = "Пупкин")]
    pub last_name: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_email(payload.email.trim())?;
    validate_username(payload.username.trim())?;
    validate_length("first_name", &payload.first_name, 1, 150)?;
    validate_length("last_name", &payload.last_name, 1, 150)?;
    validate_password(
        "password",
        &payload.password,
        payload.username.trim(),
        payload.email.trim(),
    )
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || email.chars().count() > 254 {
        return Err(AppError::field("email", "Email must be 1-254 characters"));
    }
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(AppError::field("email", "Enter a valid email address"));
    }
    Ok(())
}

/// Usernames follow `^[\w.@+-]+$`, are at most 150 characters and may not be `me`.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > 150 {
        return Err(AppError::field("username", "Username must be 1-150 characters"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
    {
        return Err(AppError::field(
            "username",
            "Username may contain only letters, digits and . @ + - _",
        ));
    }
    if username.eq_ignore_ascii_case("me") {
        return Err(AppError::field("username", "Username 'me' is reserved"));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "vasya@example.com")]
    pub email: String,
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "vasya.pupkin")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for RegisterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Public user profile as seen by the caller.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = "vasya@example.com")]
    pub email: String,
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "vasya.pupkin")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user. Always false for anonymous callers.
    pub is_subscribed: bool,
    /// Avatar URL, if one was uploaded.
    #[schema(example = "/media/3f2a...9c.png")]
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn new(user: user::Model, is_subscribed: bool, media_base: &str) -> Self {
        Self {
            avatar: user.avatar.as_deref().map(|key| media_url(media_base, key)),
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// A followed author together with a preview of their recipes.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserWithRecipesResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeMinified>,
    /// Total number of recipes by this author.
    #[schema(example = 12)]
    pub recipes_count: u64,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubscriptionQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Maximum number of recipes listed per author. Invalid values are ignored.
    #[param(value_type = Option<u64>)]
    pub recipes_limit: Option<String>,
}

/// `recipes_limit` as a cap, or `None` when absent or not a non-negative integer.
pub fn parse_recipes_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AvatarRequest {
    /// Image as `data:image/<png|jpeg|gif|webp>;base64,<payload>`.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub avatar: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AvatarResponse {
    #[schema(example = "/media/3f2a...9c.png")]
    pub avatar: String,
}
