use std::str::FromStr;
use std::time::Duration;

use sea_orm::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlxPostgresConnector,
    Statement,
    sea_query::{Index, PostgresQueryBuilder},
};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::photo;

/// Connect options for the server's `postgres` maintenance database, plus the
/// database name the URL points at.
///
/// Returns `None` when the URL names no database.
fn maintenance_options(url: &str) -> Result<Option<(PgConnectOptions, String)>, DbErr> {
    let options = PgConnectOptions::from_str(url)
        .map_err(|e| DbErr::Custom(format!("Invalid database URL: {e}")))?;
    let Some(name) = options.get_database().map(str::to_string) else {
        return Ok(None);
    };
    Ok(Some((options.database("postgres"), name)))
}

/// Create the configured database if it does not exist yet.
///
/// Connects to the server's `postgres` maintenance database to do so.
pub async fn ensure_database(url: &str) -> Result<(), DbErr> {
    let Some((admin_options, name)) = maintenance_options(url)? else {
        return Ok(());
    };
    if name == "postgres" {
        return Ok(());
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(admin_options)
        .await
        .map_err(|e| DbErr::Custom(format!("Failed to connect to maintenance database: {e}")))?;
    let admin = SqlxPostgresConnector::from_sqlx_postgres_pool(pool);
    let exists = admin
        .query_one_raw(Statement::from_sql_and_values(
            admin.get_database_backend(),
            "SELECT 1 FROM pg_database WHERE datname = $1",
            [name.clone().into()],
        ))
        .await?
        .is_some();

    if !exists {
        let quoted = name.replace('"', "\"\"");
        admin
            .execute_unprepared(&format!("CREATE DATABASE \"{quoted}\""))
            .await?;
        info!("Created database {}", name);
    }

    admin.close().await?;
    Ok(())
}

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("cabinet_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure required database indexes exist.
///
/// Schema-sync only creates the indexes declared on entities, so the
/// listing index is created here.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Newest-first listing: SELECT ... FROM photo ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_photo_created_at")
        .table(photo::Entity)
        .col(photo::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_photo_created_at exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_photo_created_at: {}", e);
        }
    }

    Ok(())
}
