//! Error types for the wallet tracker
//!
//! This module defines the common error type used by the store and gateway.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for wallet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for wallet operations
#[derive(Debug, Error)]
pub enum Error {
    // Storage errors
    #[error("disk I/O error: {0}")]
    DiskIo(#[from] std::io::Error),

    #[error("malformed wallet document at {}: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    // Request errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Startup errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a malformed document error for the file at `path`
    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if the stored document failed to parse
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }

    /// Get HTTP status code for the gateway
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidArgument(_) => 400,

            // 500 Internal Server Error
            Self::DiskIo(_) | Self::MalformedDocument { .. } | Self::Serialization(_) => 500,

            // 503 Service Unavailable
            Self::Configuration(_) => 503,
        }
    }

    /// Short machine-readable code used in JSON error bodies
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::DiskIo(_) => "StorageError",
            Self::MalformedDocument { .. } => "MalformedDocument",
            Self::Configuration(_) => "ServiceUnavailable",
            Self::Serialization(_) => "InternalError",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}
