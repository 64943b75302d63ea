use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Which table an authenticated principal comes from.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    sea_orm::DeriveActiveEnum,
    sea_orm::EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "user")]
    User,
}

/// Identity decoded from a verified session token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// Admin ids are integers and user ids are UUIDs; both travel as strings.
    pub id: String,
    pub username: String,
    pub kind: PrincipalKind,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.kind == PrincipalKind::Admin
    }
}
