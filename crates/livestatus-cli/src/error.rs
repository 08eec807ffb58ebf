//! CLI error types.

use std::fmt;

use livestatus_logcache::LogCacheError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Config file or cache settings could not be used.
    Cache(LogCacheError),
    /// Invalid argument.
    InvalidArgument(String),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache(e) => write!(f, "configuration error: {e}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cache(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<LogCacheError> for CliError {
    fn from(err: LogCacheError) -> Self {
        Self::Cache(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn cli_error_display_invalid_argument() {
        let err = CliError::InvalidArgument("until before since".into());
        assert_eq!(err.to_string(), "invalid argument: until before since");
    }

    #[test]
    fn cli_error_from_cache_error() {
        let err = CliError::from(LogCacheError::InvalidConfig("check_mem_cycle must be positive".into()));
        assert!(matches!(err, CliError::Cache(_)));
        assert!(err.to_string().starts_with("configuration error"));
        assert!(err.source().is_some());
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }
}
