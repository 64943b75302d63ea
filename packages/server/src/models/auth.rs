use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::user::UserResponse;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (3-64 characters after trimming).
    #[schema(example = "alice")]
    pub username: String,
    /// Unique email address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (6-128 characters).
    #[schema(example = "s3cret!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(AppError::Validation(
            "Username must be 3-64 characters".into(),
        ));
    }
    if !EMAIL_RE.is_match(payload.email.trim()) {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    let len = payload.password.chars().count();
    if !(6..=128).contains(&len) {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for admin and user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "admin123")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    }
    Ok(())
}

/// Public view of an admin account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin")]
    pub username: String,
}

impl From<crate::entity::admin::Model> for AdminResponse {
    fn from(admin: crate::entity::admin::Model) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
        }
    }
}

/// Successful admin login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminLoginResponse {
    /// JWT bearer token valid for 12 hours.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub admin: AdminResponse,
}

/// Successful user login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserLoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "Registration submitted, awaiting approval")]
    pub message: String,
    pub user: UserResponse,
}
