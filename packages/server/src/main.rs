use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use cabinet_common::storage::filesystem::FilesystemAssetStore;
use cabinet_server::config::AppConfig;
use cabinet_server::state::AppState;
use cabinet_server::{build_router, database, seed};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    database::ensure_database(&config.database.url)
        .await
        .context("Failed to ensure database exists")?;
    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database schema")?;
    info!("Connected to database");

    seed::ensure_default_admin(
        &db,
        &config.auth.admin_username,
        &config.auth.admin_password,
    )
    .await
    .context("Failed to seed default admin")?;

    let assets = FilesystemAssetStore::new(
        config.storage.uploads_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to prepare uploads directory {}",
            config.storage.uploads_dir.display()
        )
    })?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        assets: Arc::new(assets),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
