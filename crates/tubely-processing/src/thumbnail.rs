//! Thumbnail uploads
//!
//! Thumbnails are small, so they are buffered in memory, checked against the
//! declared image type and written to local asset storage.

use bytes::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tubely_core::{AppError, Video};
use tubely_db::VideoStore;
use tubely_storage::{extension_for_media_type, media_type_essence, random_asset_name, LocalAssetStorage};

const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Buffer a body in memory, failing with `PayloadTooLarge` once it passes
/// `max_bytes`.
pub async fn collect_capped<S>(body: S, max_bytes: u64) -> Result<Vec<u8>, AppError>
where
    S: Stream<Item = Result<Bytes, AppError>>,
{
    let mut body = std::pin::pin!(body);
    let mut data = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if (data.len() + chunk.len()) as u64 > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Thumbnail exceeds the maximum size of {} bytes",
                max_bytes
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

fn signature_for(media_type: &str) -> Option<&'static [u8]> {
    match media_type {
        "image/jpeg" => Some(JPEG_SIGNATURE),
        "image/png" => Some(PNG_SIGNATURE),
        _ => None,
    }
}

pub struct ThumbnailStore {
    videos: Arc<dyn VideoStore>,
    assets: LocalAssetStorage,
    max_bytes: u64,
}

impl ThumbnailStore {
    pub fn new(videos: Arc<dyn VideoStore>, assets: LocalAssetStorage, max_bytes: u64) -> Self {
        Self {
            videos,
            assets,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Store a thumbnail for an already owner-checked video.
    #[tracing::instrument(skip(self, video, data), fields(video_id = %video.id, size_bytes = data.len()))]
    pub async fn store(
        &self,
        video: Video,
        content_type: &str,
        data: &[u8],
    ) -> Result<Video, AppError> {
        let media_type = media_type_essence(content_type);
        let signature = signature_for(&media_type).ok_or_else(|| {
            AppError::UnsupportedMediaType(
                "Invalid file type, only JPEG and PNG are allowed".to_string(),
            )
        })?;

        if data.len() as u64 > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Thumbnail exceeds the maximum size of {} bytes",
                self.max_bytes
            )));
        }

        if !data.starts_with(signature) {
            return Err(AppError::UnsupportedMediaType(format!(
                "File contents do not match declared type {}",
                media_type
            )));
        }

        let file_name = format!(
            "{}{}",
            random_asset_name(),
            extension_for_media_type(&media_type)
        );
        let url = self.assets.save(&file_name, data).await?;

        let video = self
            .videos
            .set_thumbnail_url(video.id, &url, Utc::now())
            .await
            .map_err(|e| match e {
                AppError::Persistence(_) => e,
                other => AppError::Persistence(other.to_string()),
            })?;

        tracing::info!(file_name = %file_name, "Thumbnail stored");

        Ok(video)
    }
}
