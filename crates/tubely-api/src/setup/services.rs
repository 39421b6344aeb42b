//! Service initialization and application state setup

use crate::auth::JwtVerifier;
use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{VideoRepository, VideoStore};
use tubely_processing::{
    FfmpegRemuxer, FfprobeInspector, StagingArea, ThumbnailStore, VideoIngestor,
};
use tubely_storage::{LocalAssetStorage, Storage};

/// Initialize all services and repositories, returning the application state
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    object_storage: Arc<dyn Storage>,
    assets: LocalAssetStorage,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoStore> = Arc::new(VideoRepository::new(pool));

    let tool_timeout = Duration::from_secs(config.media_tool_timeout_secs());
    let inspector = FfprobeInspector::new(config.ffprobe_path().to_string(), tool_timeout)
        .context("Invalid FFPROBE_PATH")?;
    let remuxer = FfmpegRemuxer::new(config.ffmpeg_path().to_string(), tool_timeout)
        .context("Invalid FFMPEG_PATH")?;

    tokio::fs::create_dir_all(config.staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.staging_dir().display()
            )
        })?;

    let ingestor = VideoIngestor::new(
        videos.clone(),
        object_storage,
        Arc::new(inspector),
        Arc::new(remuxer),
        StagingArea::new(config.staging_dir().clone()),
        config.max_video_size_bytes(),
    );

    let thumbnails = ThumbnailStore::new(
        videos.clone(),
        assets,
        config.max_thumbnail_size_bytes(),
    );

    tracing::info!(
        ffprobe_path = %config.ffprobe_path(),
        ffmpeg_path = %config.ffmpeg_path(),
        media_tool_timeout_secs = config.media_tool_timeout_secs(),
        staging_dir = %config.staging_dir().display(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        videos,
        identity: Arc::new(JwtVerifier::new(config.jwt_secret())),
        ingestor: Arc::new(ingestor),
        thumbnails: Arc::new(thumbnails),
    }))
}
