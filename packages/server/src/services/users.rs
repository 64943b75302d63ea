use cabinet_common::UserStatus;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use uuid::Uuid;

use crate::entity::user;
use crate::error::AppError;
use crate::utils::hash;

/// Outcome of a moderation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Updated(user::Model),
    NotFound,
    /// The user was already moderated; only pending users can change status.
    NotPending(UserStatus),
}

pub struct UserService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a pending user. Input must already be validated.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(AppError::DuplicateUsername);
        }
        if self.find_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash::hash_password(password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

        let new_user = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password: Set(password_hash),
            status: Set(UserStatus::Pending),
            created_at: Set(Utc::now()),
        };

        new_user.insert(self.conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Registration race condition: unique constraint caught on insert");
                if detail.contains("email") {
                    AppError::DuplicateEmail
                } else {
                    AppError::DuplicateUsername
                }
            }
            _ => AppError::from(e),
        })
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn)
            .await
    }

    /// Pending users, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Status.eq(UserStatus::Pending))
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .all(self.conn)
            .await
    }

    /// Every user, newest first.
    pub async fn list_all(&self) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(self.conn)
            .await
    }

    /// Move a pending user to `next`.
    ///
    /// The update is conditional on the current status, so two concurrent
    /// decisions cannot both succeed.
    pub async fn set_status(&self, id: Uuid, next: UserStatus) -> Result<StatusChange, DbErr> {
        if !UserStatus::Pending.can_transition_to(next) {
            return Ok(match self.find(id).await? {
                Some(u) => StatusChange::NotPending(u.status),
                None => StatusChange::NotFound,
            });
        }

        let result = user::Entity::update_many()
            .col_expr(user::Column::Status, Expr::value(next))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Status.eq(UserStatus::Pending))
            .exec(self.conn)
            .await?;

        match self.find(id).await? {
            None => Ok(StatusChange::NotFound),
            Some(u) if result.rows_affected > 0 => Ok(StatusChange::Updated(u)),
            Some(u) => Ok(StatusChange::NotPending(u.status)),
        }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(id).one(self.conn).await
    }
}
