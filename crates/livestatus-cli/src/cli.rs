//! Command-line argument parsing with clap.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use livestatus_logcache::{ClassMask, LogCacheConfig};

use crate::error::CliError;

/// Inspect monitoring history log files.
#[derive(Parser, Debug, Clone)]
#[command(name = "lshistory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON config file with history locations and cache limits.
    #[arg(short, long, env = "LSHISTORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// History file the core is currently writing to.
    #[arg(long, env = "LSHISTORY_HISTORY_FILE")]
    pub history_file: Option<PathBuf>,

    /// Directory of rotated history files.
    #[arg(long, env = "LSHISTORY_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Builds the cache config from the config file and path overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the result is
    /// invalid.
    pub fn load_config(&self) -> Result<LogCacheConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => LogCacheConfig::from_json_file(path)?,
            None => LogCacheConfig::default(),
        };
        if let Some(history_file) = &self.history_file {
            config.history_file.clone_from(history_file);
        }
        if let Some(archive_dir) = &self.archive_dir {
            config.archive_dir.clone_from(archive_dir);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List history files reaching back to a point in time, newest first.
    Paths(PathsArgs),

    /// Print history entries of a time window, newest first.
    Scan(ScanArgs),
}

/// Arguments for `paths`.
#[derive(Args, Debug, Clone)]
pub struct PathsArgs {
    /// Horizon as RFC 3339 time or epoch seconds.
    #[arg(long, value_parser = parse_time)]
    pub since: DateTime<Utc>,
}

/// Arguments for `scan`.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Start of the window (inclusive), RFC 3339 or epoch seconds.
    #[arg(long, value_parser = parse_time)]
    pub since: DateTime<Utc>,

    /// End of the window (exclusive); defaults to now.
    #[arg(long, value_parser = parse_time)]
    pub until: Option<DateTime<Utc>>,

    /// Comma-separated log classes, or `all`.
    #[arg(long, default_value = "all")]
    pub classes: ClassMask,

    /// Stop after this many entries.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Maximum lines read from a single file; defaults to the config value.
    #[arg(long)]
    pub max_lines: Option<usize>,
}

/// Parses RFC 3339 timestamps and plain epoch seconds.
///
/// # Errors
///
/// Returns a message for clap if the value is neither.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| format!("timestamp out of range: {value}"));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| format!("invalid time '{value}': {e}"))
}
