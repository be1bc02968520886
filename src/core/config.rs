use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `SERIES_JOURNAL__REMOTE__BASE_URL`
pub const ENV_PREFIX: &str = "SERIES_JOURNAL";

/// Top-level configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Where the journal is persisted
    #[serde(default)]
    pub storage: StorageConfig,

    /// Remote service settings, used when `storage.backend = "remote"`
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Which persistence binding to use
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A JSON file in the data directory
    #[default]
    File,
    /// An HTTP service exposing `/series`
    Remote,
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Directory holding the collection file
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

/// Remote service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    /// Base address of the service, without the `/series` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

// Default values for optional configuration
fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then apply
    /// `SERIES_JOURNAL__SECTION__KEY` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Configuration pointing the file backend at `data_dir`
    pub fn for_data_dir(data_dir: impl Into<String>) -> Self {
        Self {
            storage: StorageConfig {
                backend: BackendKind::File,
                data_dir: data_dir.into(),
            },
            remote: RemoteConfig::default(),
        }
    }
}
