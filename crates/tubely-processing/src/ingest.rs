//! Video ingest pipeline
//!
//! stage -> classify -> remux -> upload -> record update. Each stage runs to
//! completion before the next starts and the first failure ends the request.
//! Staged files are dropped (and deleted) on every path out of `ingest`.

use crate::classify::classify_video;
use crate::probe::MediaInspector;
use crate::remux::ContainerRemuxer;
use crate::staging::StagingArea;
use bytes::Bytes;
use chrono::Utc;
use futures::Stream;
use std::sync::Arc;
use tubely_core::{AppError, Video};
use tubely_db::{get_owned_video, VideoStore};
use tubely_storage::{media_type_essence, video_storage_key, Storage};
use uuid::Uuid;

const ACCEPTED_VIDEO_TYPE: &str = "video/mp4";

pub struct VideoIngestor {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn Storage>,
    inspector: Arc<dyn MediaInspector>,
    remuxer: Arc<dyn ContainerRemuxer>,
    staging: StagingArea,
    max_upload_bytes: u64,
}

impl VideoIngestor {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn Storage>,
        inspector: Arc<dyn MediaInspector>,
        remuxer: Arc<dyn ContainerRemuxer>,
        staging: StagingArea,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            videos,
            storage,
            inspector,
            remuxer,
            staging,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Fetch the target record and check ownership before any bytes are read.
    pub async fn load_owned_video(&self, video_id: Uuid, user_id: Uuid) -> Result<Video, AppError> {
        get_owned_video(self.videos.as_ref(), video_id, user_id).await
    }

    /// Run the pipeline for one upload and return the updated record.
    ///
    /// `video` must already be loaded and owner-checked. On any error the
    /// record is left untouched, except when the final update itself fails
    /// after the object was stored.
    #[tracing::instrument(skip(self, video, body), fields(video_id = %video.id, owner_id = %video.owner_id))]
    pub async fn ingest<S>(
        &self,
        video: Video,
        content_type: &str,
        body: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send,
    {
        let start = std::time::Instant::now();

        let media_type = media_type_essence(content_type);
        if media_type != ACCEPTED_VIDEO_TYPE {
            return Err(AppError::UnsupportedMediaType(
                "Invalid file type, only MP4 is allowed".to_string(),
            ));
        }

        let staged = self
            .staging
            .stage_stream(body, self.max_upload_bytes)
            .await?;

        let aspect = classify_video(self.inspector.as_ref(), staged.path()).await?;

        let processed = self.staging.processing_sibling(&staged);
        self.remuxer.remux(staged.path(), processed.path()).await?;

        let key = video_storage_key(aspect, &media_type);
        let url = self
            .storage
            .upload_file(&key, processed.path(), &media_type)
            .await?;

        let video = match self
            .videos
            .set_playback_url(video.id, &url, Utc::now())
            .await
        {
            Ok(video) => video,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    orphaned_key = %key,
                    "Video stored but record update failed"
                );
                return Err(match e {
                    AppError::Persistence(_) => e,
                    other => AppError::Persistence(other.to_string()),
                });
            }
        };

        tracing::info!(
            key = %key,
            aspect = %aspect,
            duration_ms = start.elapsed().as_millis(),
            "Video ingested"
        );

        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::test_helpers::{CopyRemuxer, FailingRemuxer, FakeInspector};
    use futures::{stream, TryStreamExt};
    use object_store::memory::InMemory;
    use object_store::path::Path as ObjectPath;
    use object_store::{ObjectStore, ObjectStoreExt};
    use std::path::Path;
    use tubely_db::test_helpers::InMemoryVideoStore;
    use tubely_storage::S3Storage;

    struct Harness {
        _dir: tempfile::TempDir,
        staging_dir: std::path::PathBuf,
        videos: InMemoryVideoStore,
        objects: Arc<InMemory>,
        inspector: Arc<FakeInspector>,
    }

    impl Harness {
        fn new(inspector: FakeInspector) -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self {
                staging_dir: dir.path().to_path_buf(),
                _dir: dir,
                videos: InMemoryVideoStore::new(),
                objects: Arc::new(InMemory::new()),
                inspector: Arc::new(inspector),
            }
        }

        fn ingestor(&self, remuxer: Arc<dyn ContainerRemuxer>) -> VideoIngestor {
            let storage = S3Storage::with_store(
                self.objects.clone(),
                "tubely-videos".to_string(),
                "us-east-2".to_string(),
                None,
            );
            VideoIngestor::new(
                Arc::new(self.videos.clone()),
                Arc::new(storage),
                self.inspector.clone(),
                remuxer,
                StagingArea::new(&self.staging_dir),
                1024,
            )
        }

        fn staged_files(&self) -> usize {
            std::fs::read_dir(&self.staging_dir).unwrap().count()
        }
    }

    fn body(data: &'static [u8]) -> impl Stream<Item = Result<Bytes, AppError>> + Send {
        stream::iter(vec![Ok(Bytes::from_static(data))])
    }

    fn key_of(url: &str) -> &str {
        url.strip_prefix("https://tubely-videos.s3.us-east-2.amazonaws.com/")
            .unwrap()
    }

    #[tokio::test]
    async fn test_ingest_wide_video_end_to_end() {
        let harness = Harness::new(FakeInspector::with_dimensions(1280, 720));
        let remuxer = Arc::new(CopyRemuxer::new());
        let ingestor = harness.ingestor(remuxer.clone());
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        let updated = ingestor
            .ingest(video.clone(), "video/mp4", body(b"mp4 bytes"))
            .await
            .unwrap();

        let url = updated.playback_url.clone().unwrap();
        let key = key_of(&url);
        assert!(key.starts_with("wide/"));
        assert!(key.ends_with(".mp4"));
        assert_eq!(harness.inspector.calls(), 1);
        assert_eq!(remuxer.calls(), 1);

        let stored = harness.objects.get(&ObjectPath::from(key)).await.unwrap();
        assert_eq!(stored.bytes().await.unwrap().as_ref(), b"mp4 bytes");

        let record = harness.videos.get(video.id).unwrap();
        assert_eq!(record.playback_url, updated.playback_url);
        assert_eq!(record.title, "Boots");
        assert_eq!(record.owner_id, video.owner_id);
        assert_eq!(harness.staged_files(), 0);
    }

    #[tokio::test]
    async fn test_ingest_content_type_parameters_are_ignored() {
        let harness = Harness::new(FakeInspector::with_dimensions(1080, 1920));
        let ingestor = harness.ingestor(Arc::new(CopyRemuxer::new()));
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Tall", ""));

        let updated = ingestor
            .ingest(video, "Video/MP4; codecs=avc1", body(b"x"))
            .await
            .unwrap();
        assert!(key_of(updated.playback_url.as_deref().unwrap()).starts_with("tall/"));
    }

    #[tokio::test]
    async fn test_ingest_rejects_unsupported_type_before_any_work() {
        let harness = Harness::new(FakeInspector::with_dimensions(1280, 720));
        let remuxer = Arc::new(CopyRemuxer::new());
        let ingestor = harness.ingestor(remuxer.clone());
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        let err = ingestor
            .ingest(video.clone(), "video/quicktime", body(b"mov"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
        assert_eq!(harness.inspector.calls(), 0);
        assert_eq!(remuxer.calls(), 0);
        assert_eq!(harness.videos.update_calls(), 0);
        assert_eq!(harness.staged_files(), 0);
    }

    #[tokio::test]
    async fn test_ingest_probe_failure_is_processing_error() {
        let harness = Harness::new(FakeInspector::failing());
        let remuxer = Arc::new(CopyRemuxer::new());
        let ingestor = harness.ingestor(remuxer.clone());
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        let err = ingestor
            .ingest(video.clone(), "video/mp4", body(b"garbage"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Processing(_)));
        assert_eq!(remuxer.calls(), 0);
        assert!(harness.videos.get(video.id).unwrap().playback_url.is_none());
        assert_eq!(harness.staged_files(), 0);
    }

    #[tokio::test]
    async fn test_ingest_remux_failure_cleans_up_partial_output() {
        let harness = Harness::new(FakeInspector::with_dimensions(1920, 1080));
        let ingestor = harness.ingestor(Arc::new(FailingRemuxer));
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        let err = ingestor
            .ingest(video.clone(), "video/mp4", body(b"mp4 bytes"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Processing(_)));
        assert_eq!(harness.videos.update_calls(), 0);
        assert!(harness.videos.get(video.id).unwrap().playback_url.is_none());
        assert_eq!(harness.staged_files(), 0);
    }

    #[tokio::test]
    async fn test_ingest_oversized_body_is_rejected() {
        let harness = Harness::new(FakeInspector::with_dimensions(1920, 1080));
        let ingestor = harness.ingestor(Arc::new(CopyRemuxer::new()));
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        static BIG: [u8; 2048] = [0u8; 2048];
        let err = ingestor
            .ingest(video, "video/mp4", body(&BIG))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert_eq!(harness.inspector.calls(), 0);
        assert_eq!(harness.staged_files(), 0);
    }

    #[tokio::test]
    async fn test_ingest_persistence_failure_keeps_object() {
        let harness = Harness::new(FakeInspector::with_dimensions(1000, 1000));
        let ingestor = harness.ingestor(Arc::new(CopyRemuxer::new()));
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));
        harness.videos.fail_updates();

        let err = ingestor
            .ingest(video.clone(), "video/mp4", body(b"square"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
        assert!(harness.videos.get(video.id).unwrap().playback_url.is_none());
        assert_eq!(harness.staged_files(), 0);

        // The object stays behind; only the record update failed.
        let stored: Vec<_> = harness.objects.list(None).try_collect().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].location.as_ref().starts_with("other/"));
    }

    #[tokio::test]
    async fn test_second_upload_replaces_playback_url() {
        let harness = Harness::new(FakeInspector::with_dimensions(1280, 720));
        let ingestor = harness.ingestor(Arc::new(CopyRemuxer::new()));
        let video = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        let first = ingestor
            .ingest(video.clone(), "video/mp4", body(b"one"))
            .await
            .unwrap();
        let second = ingestor
            .ingest(first.clone(), "video/mp4", body(b"two"))
            .await
            .unwrap();

        assert_ne!(first.playback_url, second.playback_url);
        assert_eq!(
            harness.videos.get(video.id).unwrap().playback_url,
            second.playback_url
        );
        // The first object is not cleaned up.
        let first_key = key_of(first.playback_url.as_deref().unwrap());
        assert!(harness
            .objects
            .head(&ObjectPath::from(first_key))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_ingest_keeps_thumbnail_set_after_load() {
        let harness = Harness::new(FakeInspector::with_dimensions(1280, 720));
        let ingestor = harness.ingestor(Arc::new(CopyRemuxer::new()));
        let loaded = harness.videos.insert(Video::new(Uuid::new_v4(), "Boots", ""));

        // A thumbnail upload lands while the video is still being processed.
        harness
            .videos
            .set_thumbnail_url(loaded.id, "http://localhost:8091/assets/abc.png", Utc::now())
            .await
            .unwrap();

        let updated = ingestor
            .ingest(loaded.clone(), "video/mp4", body(b"mp4 bytes"))
            .await
            .unwrap();

        let record = harness.videos.get(loaded.id).unwrap();
        assert_eq!(
            record.thumbnail_url.as_deref(),
            Some("http://localhost:8091/assets/abc.png")
        );
        assert_eq!(record.playback_url, updated.playback_url);
        assert_eq!(updated, record);
    }

    #[tokio::test]
    async fn test_failing_inspector_reports_probe_error() {
        let inspector = FakeInspector::failing();
        let err = inspector.inspect(Path::new("/tmp/x.mp4")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::Probe(_)));
    }
}
