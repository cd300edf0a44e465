use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::MediaError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_CREDENTIALS`,
    /// `SELF_SUBSCRIPTION`, `EMPTY_CART`, `CONFLICT`, `TOKEN_MISSING`, `TOKEN_INVALID`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Cooking time must be between 1 and 32000 minutes")]
    pub message: String,
    /// Request field the error refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "cooking_time")]
    pub field: Option<&'static str>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Validation failure tied to a single request field.
    InvalidField {
        field: &'static str,
        message: String,
    },
    InvalidCredentials,
    SelfSubscription,
    EmptyCart,
    /// The relation being created already exists, or the one being removed does not.
    Conflict(String),
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    NotFound(String),
    Internal(String),
}

impl AppError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidField {
            field,
            message: message.into(),
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message, field) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::InvalidField { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                message,
                Some(field),
            ),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                "Unable to log in with provided credentials".into(),
                None,
            ),
            AppError::SelfSubscription => (
                StatusCode::BAD_REQUEST,
                "SELF_SUBSCRIPTION",
                "You cannot subscribe to yourself".into(),
                None,
            ),
            AppError::EmptyCart => (
                StatusCode::BAD_REQUEST,
                "EMPTY_CART",
                "Shopping cart is empty".into(),
                None,
            ),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg, None),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_MISSING",
                "Authentication credentials were not provided".into(),
                None,
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".into(),
                None,
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "You do not have permission to perform this action".into(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                    None,
                )
            }
        };

        (
            status,
            ErrorBody {
                code,
                message,
                field,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidImage(msg) => AppError::Validation(msg),
            MediaError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("Image must not exceed {limit} bytes"))
            }
            MediaError::NotFound(_) | MediaError::InvalidKey(_) => {
                AppError::NotFound("File not found".into())
            }
            MediaError::Io(e) => AppError::Internal(format!("Media IO error: {e}")),
        }
    }
}
