use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{admin, user};
use crate::error::AppError;
use crate::principal::{Principal, PrincipalKind};
use crate::utils::{hash, jwt};

/// Checks username/password pairs and issues session tokens.
pub struct CredentialService<'a, C: ConnectionTrait> {
    conn: &'a C,
    jwt_secret: &'a str,
}

impl<'a, C: ConnectionTrait> CredentialService<'a, C> {
    pub fn new(conn: &'a C, jwt_secret: &'a str) -> Self {
        Self { conn, jwt_secret }
    }

    /// Returns a 12-hour admin token and the admin record.
    pub async fn authenticate_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, admin::Model), AppError> {
        let Some(admin) = admin::Entity::find()
            .filter(admin::Column::Username.eq(username))
            .one(self.conn)
            .await?
        else {
            hash::burn_verification(password);
            return Err(AppError::InvalidCredentials);
        };

        check_password(password, &admin.password)?;

        let principal = Principal {
            id: admin.id.to_string(),
            username: admin.username.clone(),
            kind: PrincipalKind::Admin,
        };
        let token = self.issue(&principal, jwt::ADMIN_TOKEN_TTL)?;
        Ok((token, admin))
    }

    /// Returns a 7-day user token and the user record.
    ///
    /// Rejected accounts fail with `AccountRejected` before the password is checked.
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, user::Model), AppError> {
        let Some(user) = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn)
            .await?
        else {
            hash::burn_verification(password);
            return Err(AppError::InvalidCredentials);
        };

        if !user.status.can_login() {
            return Err(AppError::AccountRejected);
        }

        check_password(password, &user.password)?;

        let principal = Principal {
            id: user.id.to_string(),
            username: user.username.clone(),
            kind: PrincipalKind::User,
        };
        let token = self.issue(&principal, jwt::USER_TOKEN_TTL)?;
        Ok((token, user))
    }

    fn issue(&self, principal: &Principal, ttl: chrono::Duration) -> Result<String, AppError> {
        jwt::sign(principal, ttl, self.jwt_secret)
            .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))
    }
}

fn check_password(password: &str, stored: &str) -> Result<(), AppError> {
    let is_valid = hash::verify_password(password, stored)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if is_valid {
        Ok(())
    } else {
        Err(AppError::InvalidCredentials)
    }
}
