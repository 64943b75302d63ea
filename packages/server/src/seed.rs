use sea_orm::*;
use tracing::info;

use crate::entity::admin;
use crate::utils::hash;

/// Insert the configured admin account unless one with that username exists.
///
/// Returns `true` when a new account was created.
pub async fn ensure_default_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<bool, DbErr> {
    let existing = admin::Entity::find()
        .filter(admin::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let password_hash = hash::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;

    let model = admin::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(admin::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => Ok(false),
        Ok(_) => {
            info!("Seeded default admin account '{}'", username);
            Ok(true)
        }
        Err(e) => Err(e),
    }
}
