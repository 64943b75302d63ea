use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::validated::AppJson;
use crate::models::auth::{
    AdminLoginResponse, LoginRequest, RegisterRequest, RegisterResponse, UserLoginResponse,
    validate_login_request, validate_register_request,
};
use crate::services::credentials::CredentialService;
use crate::services::users::UserService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "adminLogin",
    summary = "Log in as an administrator",
    description = "Returns a bearer token valid for 12 hours.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AdminLoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn admin_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let (token, admin) = CredentialService::new(&state.db, &state.config.auth.jwt_secret)
        .authenticate_admin(payload.username.trim(), &payload.password)
        .await?;

    Ok(Json(AdminLoginResponse {
        token,
        admin: admin.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "registerUser",
    summary = "Register a user account",
    description = "Creates an account in `pending` status. An administrator approves or rejects it later.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Conflict (DUPLICATE_USERNAME, DUPLICATE_EMAIL)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let user = UserService::new(&state.db)
        .register(
            payload.username.trim(),
            payload.email.trim(),
            &payload.password,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration submitted, awaiting approval".into(),
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/user/login",
    tag = "Auth",
    operation_id = "userLogin",
    summary = "Log in as a registered user",
    description = "Returns a bearer token valid for 7 days. Rejected accounts are refused regardless of password.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserLoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account rejected (ACCOUNT_REJECTED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn user_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<UserLoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let (token, user) = CredentialService::new(&state.db, &state.config.auth.jwt_secret)
        .authenticate_user(payload.username.trim(), &payload.password)
        .await?;

    Ok(Json(UserLoginResponse {
        token,
        user: user.into(),
    }))
}
