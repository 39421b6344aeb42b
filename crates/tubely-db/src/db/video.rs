use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::{models::Video, AppError};
use uuid::Uuid;

/// Trait for video record operations
/// This abstracts the database implementation (PostgreSQL)
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Point the record at its processed video and return the updated row.
    ///
    /// Only `playback_url` and `updated_at` are written, so an upload never
    /// clobbers a thumbnail set in the meantime. Returns `NotFound` when no row
    /// has the given id.
    async fn set_playback_url(
        &self,
        id: Uuid,
        playback_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError>;

    /// Thumbnail counterpart of `set_playback_url`.
    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        thumbnail_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError>;

    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Load a video and check that `user_id` owns it.
///
/// Missing records are `NotFound`; records owned by someone else are
/// `Forbidden`.
pub async fn get_owned_video(
    store: &dyn VideoStore,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, AppError> {
    let video = store
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

    if !video.is_owned_by(user_id) {
        tracing::warn!(
            video_id = %video_id,
            user_id = %user_id,
            "Rejected access to a video owned by another user"
        );
        return Err(AppError::Forbidden(
            "You are not the owner of this video".to_string(),
        ));
    }

    Ok(video)
}

/// Postgres-backed video repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            SELECT id, owner_id, title, description, created_at, updated_at,
                   thumbnail_url, playback_url
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, playback_url), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_playback_url(
        &self,
        id: Uuid,
        playback_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET playback_url = $2,
                updated_at = $3
            WHERE id = $1
            RETURNING id, owner_id, title, description, created_at, updated_at,
                      thumbnail_url, playback_url
            "#,
        )
        .bind(id)
        .bind(playback_url)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        video.ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))
    }

    #[tracing::instrument(skip(self, thumbnail_url), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        thumbnail_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2,
                updated_at = $3
            WHERE id = $1
            RETURNING id, owner_id, title, description, created_at, updated_at,
                      thumbnail_url, playback_url
            "#,
        )
        .bind(id)
        .bind(thumbnail_url)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        video.ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::InMemoryVideoStore;

    #[tokio::test]
    async fn test_get_owned_video_returns_record_for_owner() {
        let store = InMemoryVideoStore::new();
        let owner = Uuid::new_v4();
        let video = store.insert(Video::new(owner, "Boots", ""));

        let loaded = get_owned_video(&store, video.id, owner).await.unwrap();
        assert_eq!(loaded, video);
    }

    #[tokio::test]
    async fn test_get_owned_video_missing_is_not_found() {
        let store = InMemoryVideoStore::new();
        let err = get_owned_video(&store, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_owned_video_other_owner_is_forbidden() {
        let store = InMemoryVideoStore::new();
        let video = store.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        let err = get_owned_video(&store, video.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
