use axum::{
    Json,
    extract::{Path, State},
};
use cabinet_common::UserStatus;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthPrincipal;
use crate::models::user::{UserListResponse, UserStatusResponse};
use crate::services::users::{StatusChange, UserService};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List all users",
    description = "Newest first. Requires an admin token.",
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth, state), fields(by = %auth.0.username))]
pub async fn list_users(
    auth: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    auth.require_admin()?;
    let users = UserService::new(&state.db).list_all().await?;
    Ok(Json(UserListResponse {
        data: users.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/users/pending",
    tag = "Users",
    operation_id = "listPendingUsers",
    summary = "List users awaiting moderation",
    description = "Oldest first. Requires an admin token.",
    responses(
        (status = 200, description = "Pending users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth, state), fields(by = %auth.0.username))]
pub async fn list_pending_users(
    auth: AuthPrincipal,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    auth.require_admin()?;
    let users = UserService::new(&state.db).list_pending().await?;
    Ok(Json(UserListResponse {
        data: users.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/users/{id}/approve",
    tag = "Users",
    operation_id = "approveUser",
    summary = "Approve a pending user",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User approved", body = UserStatusResponse),
        (status = 400, description = "User is not pending (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth, state), fields(by = %auth.0.username))]
pub async fn approve_user(
    auth: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserStatusResponse>, AppError> {
    auth.require_admin()?;
    moderate(&state, &id, UserStatus::Approved).await
}

#[utoipa::path(
    post,
    path = "/users/{id}/reject",
    tag = "Users",
    operation_id = "rejectUser",
    summary = "Reject a pending user",
    description = "A rejected user can no longer log in.",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User rejected", body = UserStatusResponse),
        (status = 400, description = "User is not pending (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, TOKEN_EXPIRED)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth, state), fields(by = %auth.0.username))]
pub async fn reject_user(
    auth: AuthPrincipal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserStatusResponse>, AppError> {
    auth.require_admin()?;
    moderate(&state, &id, UserStatus::Rejected).await
}

async fn moderate(
    state: &AppState,
    id: &str,
    next: UserStatus,
) -> Result<Json<UserStatusResponse>, AppError> {
    let not_found = || AppError::NotFound("User not found".into());
    let id = Uuid::parse_str(id).map_err(|_| not_found())?;

    match UserService::new(&state.db).set_status(id, next).await? {
        StatusChange::Updated(user) => {
            tracing::info!(user_id = %user.id, status = %next, "User moderated");
            Ok(Json(UserStatusResponse {
                message: format!("User {next}"),
                user: user.into(),
            }))
        }
        StatusChange::NotFound => Err(not_found()),
        StatusChange::NotPending(current) => Err(AppError::Validation(format!(
            "User is already {current}"
        ))),
    }
}
