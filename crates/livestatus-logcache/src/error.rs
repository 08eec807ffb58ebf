//! Error types for the history log cache.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening log files or loading configuration.
///
/// Cache operations themselves never fail: unreadable files are logged and
/// skipped during refresh and scans.
#[derive(Debug, Error)]
pub enum LogCacheError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The first line of a log file carries no `[timestamp]` prefix.
    #[error("no valid log line at the start of {}", .0.display())]
    NoTimestamp(PathBuf),

    /// A log class name could not be recognized.
    #[error("unknown log class: {0}")]
    UnknownClass(String),

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for log cache operations.
pub type Result<T> = std::result::Result<T, LogCacheError>;
