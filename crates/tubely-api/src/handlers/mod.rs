pub mod health;
pub mod thumbnail_upload;
pub mod video_get;
pub mod video_upload;

use axum::http::{header::CONTENT_LENGTH, HeaderMap};
use tubely_core::AppError;
use uuid::Uuid;

use crate::constants::MULTIPART_OVERHEAD_BYTES;

/// Parse the `{video_id}` path segment.
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidIdentifier("Invalid ID".to_string()))
}

/// Reject a request whose declared length cannot fit under `max_bytes` plus
/// multipart framing, before any of the body is read.
pub(crate) fn check_declared_length(headers: &HeaderMap, max_bytes: u64) -> Result<(), AppError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES) => {
            Err(AppError::PayloadTooLarge(format!(
                "Request body of {} bytes exceeds the maximum upload size of {} bytes",
                len, max_bytes
            )))
        }
        _ => Ok(()),
    }
}
