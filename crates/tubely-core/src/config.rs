//! Configuration module
//!
//! Process configuration read from the environment (with `.env` support). Every
//! knob of the upload flows lives here: backends per flow, byte ceilings, content
//! type allowlists and the locations used to build storage references.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const THUMBNAIL_MAX_BYTES: u64 = 10 << 20;
const VIDEO_MAX_BYTES: u64 = 10 << 30;
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    // Storage configuration
    pub thumbnail_storage_backend: StorageBackend,
    pub video_storage_backend: StorageBackend,
    pub assets_root: PathBuf,
    pub public_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    // Upload limits
    pub thumbnail_max_bytes: u64,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub video_max_bytes: u64,
    pub video_allowed_content_types: Vec<String>,
    pub upload_temp_dir: PathBuf,
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Base URL for assets served by this process when `PUBLIC_BASE_URL` is unset.
fn default_public_base_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

fn parse_backend(var: &str, default: StorageBackend) -> Result<StorageBackend, anyhow::Error> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", var, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let config = Config {
            server_port,
            environment,
            cors_origins: parse_list(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string())),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            thumbnail_storage_backend: parse_backend(
                "THUMBNAIL_STORAGE_BACKEND",
                StorageBackend::Local,
            )?,
            video_storage_backend: parse_backend("VIDEO_STORAGE_BACKEND", StorageBackend::S3)?,
            assets_root: env::var("ASSETS_ROOT")
                .unwrap_or_else(|_| "./assets".to_string())
                .into(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| default_public_base_url(server_port)),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            thumbnail_max_bytes: env::var("THUMBNAIL_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(THUMBNAIL_MAX_BYTES),
            thumbnail_allowed_content_types: parse_list(
                &env::var("THUMBNAIL_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| "image/jpeg,image/png".to_string()),
            ),
            video_max_bytes: env::var("VIDEO_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(VIDEO_MAX_BYTES),
            video_allowed_content_types: parse_list(
                &env::var("VIDEO_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| "video/mp4".to_string()),
            ),
            upload_temp_dir: env::var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    fn is_development(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "development" || env == "dev" || env == "test"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.is_development() && self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.video_storage_backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "VIDEO_STORAGE_BACKEND cannot be 'memory'; video uploads must go to local or s3"
            ));
        }

        let uses_s3 = self.thumbnail_storage_backend == StorageBackend::S3
            || self.video_storage_backend == StorageBackend::S3;
        if uses_s3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        if self.thumbnail_allowed_content_types.is_empty()
            || self.video_allowed_content_types.is_empty()
        {
            return Err(anyhow::anyhow!("Content type allowlists must not be empty"));
        }

        if self.thumbnail_max_bytes == 0 || self.video_max_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size ceilings must be greater than zero"));
        }

        Ok(())
    }
}
