//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{LocalAssetStorage, S3Storage, Storage};

/// Build the object store for videos and the local directory for thumbnails.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, LocalAssetStorage)> {
    tracing::info!("Initializing storage...");

    let s3 = S3Storage::new(
        config.s3_bucket().to_string(),
        config.s3_region().to_string(),
        config.s3_endpoint().map(String::from),
    )
    .context("Failed to configure S3 storage")?
    .with_cdn_base_url(config.cdn_base_url().map(String::from));

    let assets = LocalAssetStorage::new(
        config.assets_root().clone(),
        config.assets_base_url().to_string(),
    )
    .await
    .context("Failed to prepare asset directory")?;

    tracing::info!(
        bucket = %config.s3_bucket(),
        region = %config.s3_region(),
        endpoint = ?config.s3_endpoint(),
        cdn_base_url = ?config.cdn_base_url(),
        assets_root = %config.assets_root().display(),
        "Storage initialized"
    );

    Ok((Arc::new(s3), assets))
}
