//! Configuration module for the status board backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Which blob storage backend holds the status documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Filesystem,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "filesystem" | "fs" => Ok(StorageBackend::Filesystem),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError(format!("Unknown storage backend: {}", other))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError(format!("Unknown log format: {}", other))),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Blob storage backend
    pub storage: StorageBackend,
    /// Path to SQLite database file (sqlite backend)
    pub db_path: PathBuf,
    /// Root directory for blobs (filesystem backend)
    pub blob_dir: PathBuf,
    /// Seed demo entities when no current-state document exists
    pub seed_demo: bool,
    /// Live-update channel URL handed out by `/api/negotiate`; unset disables it
    pub live_updates_url: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("STATUS_BOARD_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError(format!("STATUS_BOARD_BIND_ADDR: {}", e)))?;

        let storage = lookup("STATUS_BOARD_STORAGE")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Sqlite);

        let db_path = lookup("STATUS_BOARD_DB_PATH")
            .unwrap_or_else(|| "./data/status.sqlite".to_string())
            .into();

        let blob_dir = lookup("STATUS_BOARD_BLOB_DIR")
            .unwrap_or_else(|| "./data/blobs".to_string())
            .into();

        let seed_demo = match lookup("STATUS_BOARD_SEED_DEMO") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError(format!("STATUS_BOARD_SEED_DEMO: {}", raw)))?,
            None => false,
        };

        let live_updates_url = lookup("STATUS_BOARD_LIVE_UPDATES_URL").filter(|s| !s.is_empty());

        let log_level = lookup("STATUS_BOARD_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = lookup("STATUS_BOARD_LOG_FORMAT")
            .map(|s| s.parse::<LogFormat>())
            .transpose()?
            .unwrap_or(LogFormat::Text);

        Ok(Self {
            bind_addr,
            storage,
            db_path,
            blob_dir,
            seed_demo,
            live_updates_url,
            log_level,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
