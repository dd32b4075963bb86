//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::*;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub limits: LimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

/// Bounds applied to submitted menu trees and request bodies.
#[derive(Debug, Deserialize, Clone)]
pub struct LimitSettings {
    pub max_items: usize,
    pub max_depth: usize,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    /// Directory for the daily rolling log file. Stdout only when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: AppConfig = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Built-in defaults only, without reading files or the environment.
    pub fn defaults() -> Result<Self, AppError> {
        let settings: AppConfig = Self::builder()?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", DEFAULT_HOST)?
            .set_default("app.port", DEFAULT_PORT as u64)?
            .set_default("app.name", DEFAULT_APP_NAME)?
            .set_default("database.url", "postgres://localhost/menu_builder")?
            .set_default("database.max_connections", DEFAULT_MAX_CONNECTIONS as u64)?
            .set_default("database.acquire_timeout_seconds", DEFAULT_ACQUIRE_TIMEOUT_SECONDS)?
            .set_default("database.run_migrations", true)?
            .set_default("storage.backend", "postgres")?
            .set_default("limits.max_items", DEFAULT_MAX_ITEMS as u64)?
            .set_default("limits.max_depth", DEFAULT_MAX_DEPTH as u64)?
            .set_default("limits.body_limit_bytes", DEFAULT_BODY_LIMIT_BYTES as u64)?
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?
            .set_default("logging.format", "json")
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.limits.max_items == 0 {
            return Err(AppError::InvalidConfig("limits.max_items must be positive".into()));
        }
        if self.limits.max_depth == 0 {
            return Err(AppError::InvalidConfig("limits.max_depth must be positive".into()));
        }
        if self.storage.backend == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "database.url is required for the postgres backend".into(),
            ));
        }
        Ok(())
    }
}
