//! Application state shared by every handler.

use crate::auth::IdentityVerifier;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoStore;
use tubely_processing::{ThumbnailStore, VideoIngestor};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoStore>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub ingestor: Arc<VideoIngestor>,
    pub thumbnails: Arc<ThumbnailStore>,
}
