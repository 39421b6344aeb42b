//! Fake media tools for testing without ffprobe or ffmpeg

use crate::error::ProcessingError;
use crate::probe::{MediaInspector, VideoDimensions};
use crate::remux::ContainerRemuxer;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Inspector that reports fixed dimensions, or fails like an unreadable file.
pub struct FakeInspector {
    dimensions: Option<VideoDimensions>,
    calls: AtomicUsize,
}

impl FakeInspector {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            dimensions: Some(VideoDimensions { width, height }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            dimensions: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaInspector for FakeInspector {
    async fn inspect(&self, path: &Path) -> Result<VideoDimensions, ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if tokio::fs::metadata(path).await.is_err() {
            return Err(ProcessingError::Probe(format!(
                "{} does not exist",
                path.display()
            )));
        }
        self.dimensions
            .ok_or_else(|| ProcessingError::Probe("moov atom not found".to_string()))
    }
}

/// Remuxer that copies the input unchanged.
#[derive(Default)]
pub struct CopyRemuxer {
    calls: AtomicUsize,
}

impl CopyRemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerRemuxer for CopyRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), ProcessingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::copy(input, output)
            .await
            .map_err(|e| ProcessingError::Remux(e.to_string()))?;
        Ok(())
    }
}

/// Remuxer that leaves a partial output file behind and then fails.
pub struct FailingRemuxer;

#[async_trait]
impl ContainerRemuxer for FailingRemuxer {
    async fn remux(&self, _input: &Path, output: &Path) -> Result<(), ProcessingError> {
        tokio::fs::write(output, b"partial")
            .await
            .map_err(|e| ProcessingError::Remux(e.to_string()))?;
        Err(ProcessingError::Remux(
            "ffmpeg exited with exit status: 1: Invalid data found when processing input"
                .to_string(),
        ))
    }
}
