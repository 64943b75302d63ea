use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cabinet_common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `MISSING_FILE`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `TOKEN_EXPIRED`, `INVALID_CREDENTIALS`,
    /// `ACCOUNT_REJECTED`, `PERMISSION_DENIED`, `NOT_FOUND`, `DUPLICATE_USERNAME`,
    /// `DUPLICATE_EMAIL`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Password must be at least 6 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// The multipart upload carried no `photo` file field.
    MissingFile,
    TokenMissing,
    TokenInvalid,
    TokenExpired,
    InvalidCredentials,
    /// The account was rejected by an administrator and may not log in.
    AccountRejected,
    PermissionDenied,
    NotFound(String),
    DuplicateUsername,
    DuplicateEmail,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "MISSING_FILE",
                    message: "A photo file is required in the 'photo' field".into(),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid token".into(),
                },
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_EXPIRED",
                    message: "Session expired, please log in again".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid username or password".into(),
                },
            ),
            AppError::AccountRejected => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "ACCOUNT_REJECTED",
                    message: "This account has been rejected".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::DuplicateUsername => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_USERNAME",
                    message: "Username is already taken".into(),
                },
            ),
            AppError::DuplicateEmail => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_EMAIL",
                    message: "Email is already registered".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
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

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::Validation(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::InvalidName(name) => {
                AppError::Validation(format!("Invalid file name '{name}'"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
