use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;

use super::error::StorageError;
use super::traits::{AssetStore, StoredAsset};

/// Filesystem-backed asset store.
///
/// Assets live directly under `{base_path}/{name}`. Writes go through
/// `{base_path}/.tmp` and are renamed into place, so a partially written
/// file is never visible under its final name.
pub struct FilesystemAssetStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemAssetStore {
    /// Create a new filesystem asset store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a given asset name.
    fn asset_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.base_path.join(name))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// Asset names must be a single visible path component.
fn validate_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && !name.chars().any(|c| c.is_ascii_control());
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    async fn put(&self, name: &str, data: &[u8]) -> Result<StoredAsset, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let asset_path = self.asset_path(name)?;
        if fs::try_exists(&asset_path).await? {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let receipt = StoredAsset {
            size: data.len() as u64,
            sha256: hex::encode(Sha256::digest(data)),
        };

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &asset_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(receipt)
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let asset_path = self.asset_path(name)?;
        match fs::remove_file(&asset_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn root(&self) -> &Path {
        &self.base_path
    }
}
