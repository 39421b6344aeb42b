//! Temporary on-disk copies of uploaded videos
//!
//! Every `StagedFile` deletes its file when dropped, so early returns, errors
//! and panics all leave the staging directory as they found it.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tubely_core::AppError;

const STAGED_FILE_PREFIX: &str = "tubely-upload-";
const STAGED_FILE_SUFFIX: &str = ".mp4";
const PROCESSING_SUFFIX: &str = ".processing";

/// Exclusively owned temp file, removed on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    /// Take ownership of `path` so it is removed on drop, whether or not a
    /// file exists there yet.
    pub fn adopt(path: PathBuf) -> Self {
        Self {
            path: TempPath::from_path(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create an empty staged file and an open handle for writing it.
    pub fn create(&self) -> Result<(StagedFile, tokio::fs::File), AppError> {
        let named = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(STAGED_FILE_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create staged file in {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;

        let (file, path) = named.into_parts();
        Ok((StagedFile { path }, tokio::fs::File::from_std(file)))
    }

    /// Copy an upload body into a new staged file.
    ///
    /// Writing stops with `PayloadTooLarge` as soon as more than `max_bytes`
    /// have arrived; the partial file is removed with the handle.
    pub async fn stage_stream<S>(&self, body: S, max_bytes: u64) -> Result<StagedFile, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>>,
    {
        let start = std::time::Instant::now();
        let (staged, mut file) = self.create()?;
        let mut body = std::pin::pin!(body);
        let mut total: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            total += chunk.len() as u64;
            if total > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "Video exceeds the maximum upload size of {} bytes",
                    max_bytes
                )));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;

        tracing::debug!(
            path = %staged.path().display(),
            size_bytes = total,
            duration_ms = start.elapsed().as_millis(),
            "Upload staged"
        );

        Ok(staged)
    }

    /// Reserve `<input>.processing` for the remux output.
    pub fn processing_sibling(&self, input: &StagedFile) -> StagedFile {
        let mut name = input.path().as_os_str().to_os_string();
        name.push(PROCESSING_SUFFIX);
        StagedFile::adopt(PathBuf::from(name))
    }
}
