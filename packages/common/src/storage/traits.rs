use std::path::Path;

use async_trait::async_trait;

use super::error::StorageError;

/// Receipt for bytes written by [`AssetStore::put`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAsset {
    pub size: u64,
    /// Lowercase hex SHA-256 of the stored bytes.
    pub sha256: String,
}

/// Named asset storage (originals and their derived variants).
///
/// Names are flat: a single path component chosen by the caller.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store bytes under `name`.
    ///
    /// Fails with `AlreadyExists` rather than overwriting an existing asset.
    async fn put(&self, name: &str, data: &[u8]) -> Result<StoredAsset, StorageError>;

    /// Delete an asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;

    /// Directory that static file serving should expose.
    fn root(&self) -> &Path;
}
