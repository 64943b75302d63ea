use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::errors::ErrorKind;

use crate::error::AppError;
use crate::principal::Principal;
use crate::state::AppState;
use crate::utils::jwt;

/// Principal extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Admin-only
/// handlers call `require_admin()` in the handler body.
pub struct AuthPrincipal(pub Principal);

impl AuthPrincipal {
    /// Returns `Ok(())` for admin tokens, `Err(PermissionDenied)` otherwise.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

/// Decode a bearer header value into a principal.
pub fn principal_from_header(header: Option<&str>, secret: &str) -> Result<Principal, AppError> {
    let header = header.ok_or(AppError::TokenMissing)?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::TokenMissing)?;

    let claims = jwt::verify(token, secret).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::TokenInvalid,
    })?;

    Ok(claims.into_principal())
}

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        principal_from_header(header, &state.config.auth.jwt_secret).map(AuthPrincipal)
    }
}
