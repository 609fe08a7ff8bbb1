//! Configuration types for the wallet tracker
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `WALLET_*` environment variables (`__` separates nested keys, e.g.
//! `WALLET_STORAGE__DATA_DIR`). The gateway applies CLI overrides last.

use crate::error::{Error, Result};
use crate::types::DEFAULT_WELCOME_MESSAGE;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "WALLET";

/// Root configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Wallet document storage configuration
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional file plus the environment
    ///
    /// A missing file is not an error; the defaults apply.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if a source cannot be parsed or the
    /// result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    ///
    /// # Errors
    /// Returns `Error::Configuration` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let file_name = &self.storage.file_name;
        if file_name.is_empty() {
            return Err(Error::Configuration("storage.file_name is empty".into()));
        }
        if Path::new(file_name).components().count() != 1 {
            return Err(Error::Configuration(format!(
                "storage.file_name must be a bare file name, got {file_name:?}"
            )));
        }
        if self.logging.file_enabled && self.logging.file_name.is_empty() {
            return Err(Error::Configuration("logging.file_name is empty".into()));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: SocketAddr,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Directory holding `index.html`
    pub templates_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8000)),
            static_dir: PathBuf::from("static"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

/// Wallet document storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the wallet document
    pub data_dir: PathBuf,
    /// File name of the wallet document
    pub file_name: String,
    /// Message used when a fresh document is created
    pub welcome_message: String,
}

impl StorageConfig {
    /// Full path of the wallet document
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_name: "wallet_data.json".to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (`RUST_LOG` takes precedence)
    pub level: String,
    /// Console output format
    pub format: LogFormat,
    /// Also write a daily-rotated log file
    pub file_enabled: bool,
    /// Directory for the log file
    pub directory: PathBuf,
    /// Log file name prefix
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file_enabled: true,
            directory: PathBuf::from("."),
            file_name: "wallet.log".to_string(),
        }
    }
}
