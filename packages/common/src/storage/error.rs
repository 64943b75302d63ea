use thiserror::Error;

/// Errors that can occur during asset storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An asset with this name is already stored.
    #[error("asset already exists: {0}")]
    AlreadyExists(String),
    /// The asset name is not a single, safe path component.
    #[error("invalid asset name: {0}")]
    InvalidName(String),
    /// The asset exceeds the configured size limit.
    #[error("asset exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
