//! Storage abstraction trait
//!
//! This module defines the Storage trait that object-storage backends implement.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Upload(err.to_string())
    }
}

/// Storage abstraction trait
///
/// Uploads are streamed from a file on disk so a video never has to fit in
/// memory.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the file at `path` under `storage_key` and return its public URL.
    ///
    /// `content_type` is stored with the object. A failed upload leaves no
    /// object behind.
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String>;
}
