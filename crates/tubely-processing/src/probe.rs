//! Video inspection with ffprobe

use crate::error::ProcessingError;
use crate::tool::{run_tool, stderr_summary, validate_tool_path};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

/// Pixel dimensions of a video's first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

/// Reports the dimensions of a staged video file.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn inspect(&self, path: &Path) -> Result<VideoDimensions, ProcessingError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse ffprobe's `-print_format json -show_streams` output.
///
/// Only the first stream is considered. Missing or zero dimensions are an
/// error rather than a guess.
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoDimensions, ProcessingError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Probe(format!("could not parse ffprobe output: {}", e)))?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| ProcessingError::Probe("no video stream found".to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(VideoDimensions { width, height })
        }
        (width, height) => Err(ProcessingError::Probe(format!(
            "video stream has no usable dimensions (width={:?}, height={:?})",
            width, height
        ))),
    }
}

pub struct FfprobeInspector {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Result<Self, ProcessingError> {
        validate_tool_path(&ffprobe_path)?;
        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn inspect(&self, path: &Path) -> Result<VideoDimensions, ProcessingError> {
        let start = std::time::Instant::now();

        let mut args: Vec<&OsStr> = [
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ]
        .into_iter()
        .map(OsStr::new)
        .collect();
        args.push(path.as_os_str());

        let output = run_tool(&self.ffprobe_path, args, self.timeout).await?;

        if !output.status.success() {
            return Err(ProcessingError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr_summary(&output)
            )));
        }

        let dimensions = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width = dimensions.width,
            height = dimensions.height,
            "Video probe completed"
        );

        Ok(dimensions)
    }
}
