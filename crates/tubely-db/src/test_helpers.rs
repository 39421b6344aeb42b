//! In-memory `VideoStore` for testing without a database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tubely_core::{models::Video, AppError};
use uuid::Uuid;

use crate::db::VideoStore;

#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    fail_updates: Arc<AtomicBool>,
    update_calls: Arc<AtomicUsize>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Video>>, AppError> {
        self.videos
            .lock()
            .map_err(|_| AppError::Persistence("video store lock poisoned".to_string()))
    }

    /// Seed a record and return it.
    pub fn insert(&self, video: Video) -> Video {
        self.videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        video
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    /// Make every subsequent URL update fail with a persistence error.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn update_with(&self, id: Uuid, apply: impl FnOnce(&mut Video)) -> Result<Video, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("connection reset".to_string()));
        }

        let mut videos = self.lock()?;
        let video = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        apply(video);
        Ok(video.clone())
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn set_playback_url(
        &self,
        id: Uuid,
        playback_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        self.update_with(id, |video| {
            video.playback_url = Some(playback_url.to_string());
            video.updated_at = updated_at;
        })
    }

    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        thumbnail_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        self.update_with(id, |video| {
            video.thumbnail_url = Some(thumbnail_url.to_string());
            video.updated_at = updated_at;
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
