//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so that an empty file is valid.

pub mod app;
pub mod database;
pub mod logging;
pub mod storage;
pub mod upload;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::database::{DatabaseBackend, DatabaseConfig};
use self::logging::LoggingConfig;
use self::storage::{StorageConfig, StorageProviderKind};
use self::upload::UploadConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides, e.g. `DRIVE__SERVER__PORT`.
const ENV_PREFIX: &str = "DRIVE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges `config/default.toml`, the environment-specific overlay and
    /// environment variables prefixed with `DRIVE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let base = dir.join("default");
        let overlay = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::with_name(&base.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&overlay.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject combinations that cannot produce a working server.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.backend = \"postgres\"",
            ));
        }
        if self.storage.provider == StorageProviderKind::Local && self.storage.root_path.is_empty()
        {
            return Err(AppError::configuration(
                "storage.root_path is required for the local provider",
            ));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(AppError::configuration(
                "upload.allowed_extensions must not be empty",
            ));
        }
        if self.upload.max_batch_files == 0 {
            return Err(AppError::configuration("upload.max_batch_files must be > 0"));
        }
        if self.server.owner_header.trim().is_empty() {
            return Err(AppError::configuration("server.owner_header must not be empty"));
        }
        Ok(())
    }
}
