#![allow(dead_code)]

pub mod auth;
pub mod fixtures;
pub mod storage;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::TestServer;
use object_store::memory::InMemory;
use tempfile::TempDir;
use tubely_api::auth::JwtVerifier;
use tubely_api::setup::routes::setup_routes;
use tubely_api::state::AppState;
use tubely_core::{Config, StorageBackend, Video};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{create_storage, ConfiguredStorage, S3Storage};
use uuid::Uuid;

use self::storage::{FailingStorage, FailingUpdateRepository, RecordingStorage};

pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";
pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_REGION: &str = "us-east-2";

/// Returns the API path for a route under the API prefix.
pub fn api_path(path: &str) -> String {
    format!("{}{}", tubely_api::constants::API_PREFIX, path)
}

/// Backend wired into one upload flow of the test app.
#[derive(Clone)]
pub enum Backend {
    Local,
    Memory,
    ObjectStore(Arc<InMemory>),
    Recording(Arc<RecordingStorage>),
    Failing(Arc<FailingStorage>),
}

pub struct TestAppBuilder {
    thumbnails: Backend,
    videos: Backend,
    thumbnail_max_bytes: u64,
    video_max_bytes: u64,
    fail_record_updates: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            thumbnails: Backend::Local,
            videos: Backend::ObjectStore(Arc::new(InMemory::new())),
            thumbnail_max_bytes: 10 << 20,
            video_max_bytes: 10 << 20,
            fail_record_updates: false,
        }
    }
}

impl TestAppBuilder {
    pub fn thumbnails(mut self, backend: Backend) -> Self {
        self.thumbnails = backend;
        self
    }

    pub fn videos(mut self, backend: Backend) -> Self {
        self.videos = backend;
        self
    }

    pub fn thumbnail_max_bytes(mut self, max: u64) -> Self {
        self.thumbnail_max_bytes = max;
        self
    }

    pub fn video_max_bytes(mut self, max: u64) -> Self {
        self.video_max_bytes = max;
        self
    }

    pub fn fail_record_updates(mut self) -> Self {
        self.fail_record_updates = true;
        self
    }

    pub async fn build(self) -> TestApp {
        let assets_dir = TempDir::new().expect("Failed to create assets dir");
        let upload_dir = TempDir::new().expect("Failed to create upload dir");

        let config = test_config(
            assets_dir.path(),
            upload_dir.path(),
            self.thumbnail_max_bytes,
            self.video_max_bytes,
        );

        let thumbnails = configure(&self.thumbnails, &config).await;
        let videos = configure(&self.videos, &config).await;

        let repo = Arc::new(InMemoryVideoRepository::new());
        let records: Arc<dyn VideoRepository> = if self.fail_record_updates {
            Arc::new(FailingUpdateRepository::new(repo.clone()))
        } else {
            repo.clone()
        };

        let state = Arc::new(AppState::new(
            config.clone(),
            records,
            Arc::new(JwtVerifier::new(auth::TEST_JWT_SECRET)),
            thumbnails,
            videos,
        ));

        let app = setup_routes(&config, state.clone()).expect("Failed to build router");
        let server =
            TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp {
            server,
            state,
            repo,
            assets_dir,
            upload_dir,
        }
    }
}

async fn configure(backend: &Backend, config: &Config) -> ConfiguredStorage {
    match backend {
        Backend::Local => create_storage(StorageBackend::Local, config)
            .await
            .expect("Failed to create local storage"),
        Backend::Memory => create_storage(StorageBackend::Memory, config)
            .await
            .expect("Failed to create cache storage"),
        Backend::ObjectStore(store) => ConfiguredStorage {
            storage: Arc::new(S3Storage::with_store(
                store.clone(),
                TEST_BUCKET.to_string(),
                TEST_REGION.to_string(),
                None,
            )),
            cache: None,
        },
        Backend::Recording(storage) => ConfiguredStorage {
            storage: storage.clone(),
            cache: None,
        },
        Backend::Failing(storage) => ConfiguredStorage {
            storage: storage.clone(),
            cache: None,
        },
    }
}

pub fn test_config(
    assets_root: &Path,
    upload_temp_dir: &Path,
    thumbnail_max_bytes: u64,
    video_max_bytes: u64,
) -> Config {
    Config {
        server_port: 8091,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        jwt_secret: auth::TEST_JWT_SECRET.to_string(),
        database_url: None,
        thumbnail_storage_backend: StorageBackend::Local,
        video_storage_backend: StorageBackend::S3,
        assets_root: assets_root.to_path_buf(),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        s3_bucket: Some(TEST_BUCKET.to_string()),
        s3_region: Some(TEST_REGION.to_string()),
        s3_endpoint: None,
        thumbnail_max_bytes,
        thumbnail_allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        video_max_bytes,
        video_allowed_content_types: vec!["video/mp4".to_string()],
        upload_temp_dir: upload_temp_dir.to_path_buf(),
    }
}

/// Test application with isolated asset and staging directories
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub repo: Arc<InMemoryVideoRepository>,
    pub assets_dir: TempDir,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Create a record owned by `owner`.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::new(owner, "Boots and cats");
        self.repo.create(&video).await.expect("Failed to seed video");
        video
    }

    pub async fn video(&self, id: Uuid) -> Video {
        self.repo.get(id).await.expect("Video should exist")
    }

    pub fn asset_files(&self) -> Vec<PathBuf> {
        dir_entries(self.assets_dir.path())
    }

    pub fn staging_files(&self) -> Vec<PathBuf> {
        dir_entries(self.upload_dir.path())
    }
}

fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| entry.expect("Failed to read entry").path())
        .collect()
}
