//! Container remux with ffmpeg
//!
//! Streams are copied untouched; only the container is rewritten so the index
//! sits at the front and playback can start before the download finishes.

use crate::error::ProcessingError;
use crate::tool::{run_tool, stderr_summary, validate_tool_path};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

#[async_trait]
pub trait ContainerRemuxer: Send + Sync {
    /// Write a fast-start copy of `input` to `output`.
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), ProcessingError>;
}

pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Result<Self, ProcessingError> {
        validate_tool_path(&ffmpeg_path)?;
        Ok(Self {
            ffmpeg_path,
            timeout,
        })
    }
}

#[async_trait]
impl ContainerRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), ProcessingError> {
        let start = std::time::Instant::now();

        let args: Vec<&OsStr> = vec![
            OsStr::new("-y"),
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output.as_os_str(),
        ];

        let result = run_tool(&self.ffmpeg_path, args, self.timeout).await?;

        if !result.status.success() {
            return Err(ProcessingError::Remux(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr_summary(&result)
            )));
        }

        // A zero exit without an output file still counts as a failure.
        if tokio::fs::metadata(output).await.is_err() {
            return Err(ProcessingError::Remux(format!(
                "ffmpeg produced no output at {}",
                output.display()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            "Video remux completed"
        );

        Ok(())
    }
}
