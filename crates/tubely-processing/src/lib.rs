//! Tubely processing library
//!
//! The video ingest pipeline and everything it drives:
//!
//! - `probe` / `classify`: ffprobe dimensions and aspect-ratio buckets
//! - `remux`: ffmpeg container rewrite with the index moved to the front
//! - `staging`: temp files that are removed when their handle drops
//! - `ingest`: the orchestrator tying the stages to storage and the record store
//! - `thumbnail`: image uploads written to local asset storage

pub mod classify;
pub mod error;
pub mod ingest;
pub mod probe;
pub mod remux;
pub mod staging;
pub mod thumbnail;
mod tool;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use classify::{classify_aspect_ratio, classify_video};
pub use error::ProcessingError;
pub use ingest::VideoIngestor;
pub use probe::{parse_probe_output, FfprobeInspector, MediaInspector, VideoDimensions};
pub use remux::{ContainerRemuxer, FfmpegRemuxer};
pub use staging::{StagedFile, StagingArea};
pub use thumbnail::{collect_capped, ThumbnailStore};
