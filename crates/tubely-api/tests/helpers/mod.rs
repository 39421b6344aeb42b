//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the production one from `setup::routes`; only the record
//! store, object store and media tools are swapped for in-process doubles, so
//! no database, bucket or ffmpeg install is needed.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use object_store::memory::InMemory;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::auth::JwtVerifier;
use tubely_api::constants;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::{Config, ServerConfig, Video};
use tubely_db::test_helpers::InMemoryVideoStore;
use tubely_processing::test_helpers::{CopyRemuxer, FailingRemuxer, FakeInspector};
use tubely_processing::{ContainerRemuxer, StagingArea, ThumbnailStore, VideoIngestor};
use tubely_storage::{LocalAssetStorage, S3Storage};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_BUCKET: &str = "tubely-videos";
pub const TEST_REGION: &str = "us-east-2";
pub const TEST_ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Knobs for a single test application.
pub struct TestOptions {
    pub dimensions: Option<(u32, u32)>,
    pub failing_remuxer: bool,
    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub production: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            dimensions: Some((1280, 720)),
            failing_remuxer: false,
            max_video_size_bytes: 1024 * 1024,
            max_thumbnail_size_bytes: 64 * 1024,
            production: false,
        }
    }
}

/// Test application: server plus handles on every double behind it.
pub struct TestApp {
    pub server: TestServer,
    pub videos: InMemoryVideoStore,
    pub objects: Arc<InMemory>,
    pub inspector: Arc<FakeInspector>,
    pub remuxer: Arc<CopyRemuxer>,
    pub jwt: JwtVerifier,
    pub staging_dir: TempDir,
    pub assets_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.jwt
            .issue(user_id, Duration::from_secs(3600))
            .expect("Failed to sign test token")
    }

    /// Insert a video owned by `owner_id` and return it.
    pub fn seed_video(&self, owner_id: Uuid) -> Video {
        self.videos
            .insert(Video::new(owner_id, "Boots' first video", "A cat video"))
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .expect("Failed to read staging dir")
            .count()
    }

    pub fn asset_path(&self, file_name: &str) -> PathBuf {
        self.assets_dir.path().join(file_name)
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");
    let assets_dir = tempfile::tempdir().expect("Failed to create assets dir");

    let config = Config(Box::new(ServerConfig {
        server_port: 8091,
        environment: if options.production { "production" } else { "test" }.to_string(),
        cors_origins: vec!["*".to_string()],
        log_format: "text".to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        s3_bucket: TEST_BUCKET.to_string(),
        s3_region: TEST_REGION.to_string(),
        s3_endpoint: None,
        cdn_base_url: None,
        assets_root: assets_dir.path().to_path_buf(),
        assets_base_url: TEST_ASSETS_BASE_URL.to_string(),
        staging_dir: staging_dir.path().to_path_buf(),
        max_video_size_bytes: options.max_video_size_bytes,
        max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        media_tool_timeout_secs: 5,
    }));

    let videos = InMemoryVideoStore::new();
    let objects = Arc::new(InMemory::new());
    let inspector = Arc::new(match options.dimensions {
        Some((width, height)) => FakeInspector::with_dimensions(width, height),
        None => FakeInspector::failing(),
    });
    let remuxer = Arc::new(CopyRemuxer::new());
    let active_remuxer: Arc<dyn ContainerRemuxer> = if options.failing_remuxer {
        Arc::new(FailingRemuxer)
    } else {
        remuxer.clone()
    };

    let storage = S3Storage::with_store(
        objects.clone(),
        TEST_BUCKET.to_string(),
        TEST_REGION.to_string(),
        None,
    );
    let assets = LocalAssetStorage::new(assets_dir.path(), TEST_ASSETS_BASE_URL.to_string())
        .await
        .expect("Failed to create asset storage");

    let store: Arc<InMemoryVideoStore> = Arc::new(videos.clone());
    let ingestor = VideoIngestor::new(
        store.clone(),
        Arc::new(storage),
        inspector.clone(),
        active_remuxer,
        StagingArea::new(staging_dir.path()),
        config.max_video_size_bytes(),
    );
    let thumbnails = ThumbnailStore::new(store.clone(), assets, config.max_thumbnail_size_bytes());

    let state = Arc::new(AppState {
        config: config.clone(),
        videos: store,
        identity: Arc::new(JwtVerifier::new(TEST_JWT_SECRET)),
        ingestor: Arc::new(ingestor),
        thumbnails: Arc::new(thumbnails),
    });

    let router = routes::setup_routes(state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        videos,
        objects,
        inspector,
        remuxer,
        jwt: JwtVerifier::new(TEST_JWT_SECRET),
        staging_dir,
        assets_dir,
    }
}

/// A form with one file part.
pub fn file_form(field: &str, data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(data).file_name(file_name).mime_type(mime_type);
    MultipartForm::new().add_part(field.to_string(), part)
}
