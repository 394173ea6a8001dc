//! Error types for tablelog-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tablelog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An on-disk document failed to parse
    #[error("malformed document {}: {source}", path.display())]
    MalformedDocument {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Document store name was never initialized
    #[error("document {0:?} is not initialized")]
    NotInitialized(String),

    /// Document store name does not exist
    #[error("document {0:?} does not exist")]
    NotFound(String),

    /// Color string is not a `#rrggbb` code
    #[error("invalid color code: {0:?}")]
    InvalidColor(String),

    /// Path cannot be split into directory and file name
    #[error("invalid log file path: {0}")]
    InvalidPath(String),

    /// Log file enumeration failed
    #[error("file discovery error: {0}")]
    Discovery(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for tablelog-core
pub type Result<T> = std::result::Result<T, Error>;
