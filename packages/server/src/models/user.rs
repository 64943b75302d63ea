use cabinet_common::UserStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Public view of a registered user. Never includes the password hash.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
}

/// Result of an approve/reject decision.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserStatusResponse {
    #[schema(example = "User approved")]
    pub message: String,
    pub user: UserResponse,
}
