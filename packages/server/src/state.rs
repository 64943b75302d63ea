use std::sync::Arc;

use cabinet_common::storage::AssetStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    /// Originals, thumbnails and compressed variants.
    pub assets: Arc<dyn AssetStore>,
}
