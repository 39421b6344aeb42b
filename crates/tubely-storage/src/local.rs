use crate::traits::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage for thumbnails
///
/// Files are written flat under `base_path` and served by the API under
/// `base_url`.
#[derive(Clone, Debug)]
pub struct LocalAssetStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalAssetStorage {
    /// Create a new LocalAssetStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for asset files (e.g., "./assets")
    /// * `base_url` - Base URL the directory is served under (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create asset directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalAssetStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a file name to a path inside the asset root.
    ///
    /// Names are a single path component; separators and parent references
    /// are rejected so nothing can be written outside the root.
    fn key_to_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        if file_name.is_empty()
            || file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Asset name contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(file_name))
    }

    /// Generate public URL for file
    pub fn asset_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }

    /// Write `data` as `file_name` and return its public URL.
    ///
    /// A partially written file is removed before the error is returned.
    pub async fn save(&self, file_name: &str, data: &[u8]) -> StorageResult<String> {
        let path = self.key_to_path(file_name)?;
        let start = std::time::Instant::now();

        if let Err(e) = write_new_file(&path, data).await {
            tracing::error!(
                error = %e,
                path = %path.display(),
                "Local asset write failed"
            );
            return Err(e.into());
        }

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local asset write successful"
        );

        Ok(self.asset_url(file_name))
    }
}

async fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;
    if written.is_err() {
        let _ = fs::remove_file(path).await;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path(), "http://localhost:8091/assets/".to_string())
            .await
            .unwrap();

        let url = storage.save("abc.png", b"\x89PNG").await.unwrap();
        assert_eq!(url, "http://localhost:8091/assets/abc.png");
        assert_eq!(tokio::fs::read(dir.path().join("abc.png")).await.unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_save_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path(), "/assets".to_string())
            .await
            .unwrap();

        for name in ["../evil.png", "nested/evil.png", "..\\evil.png", ""] {
            let err = storage.save(name, b"x").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn test_new_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("assets");
        let storage = LocalAssetStorage::new(&root, "/assets".to_string()).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(storage.base_path(), root.as_path());
    }
}
