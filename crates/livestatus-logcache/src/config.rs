//! Configuration of history file locations and cache limits.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LogCacheError, Result};
use crate::traits::MonitoringCore;
use crate::types::LogFilter;

/// Configuration for a [`LogCache`](crate::cache::LogCache).
///
/// Implements [`MonitoringCore`], so a plain config can back a cache directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogCacheConfig {
    /// History file currently being written to.
    pub history_file: PathBuf,
    /// Directory of rotated history files.
    pub archive_dir: PathBuf,
    /// Loaded messages above which housekeeping frees entries.
    pub max_cached_messages: usize,
    /// Minimum growth of loaded messages between housekeeping runs.
    pub check_mem_cycle: usize,
    /// Default line cap per file for scans.
    pub max_lines_per_logfile: usize,
}

impl Default for LogCacheConfig {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from("var/nagios/nagios.log"),
            archive_dir: PathBuf::from("var/nagios/archive"),
            max_cached_messages: 500_000,
            check_mem_cycle: 1000,
            max_lines_per_logfile: LogFilter::DEFAULT_MAX_LINES_PER_LOGFILE,
        }
    }
}

impl LogCacheConfig {
    /// Creates a config for the given history file and archive directory.
    #[must_use]
    pub fn new(history_file: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            history_file: history_file.into(),
            archive_dir: archive_dir.into(),
            ..Default::default()
        }
    }

    /// Loads a config from a JSON file; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the memory limit in messages.
    #[must_use]
    pub const fn with_max_cached_messages(mut self, max: usize) -> Self {
        self.max_cached_messages = max;
        self
    }

    /// Sets the housekeeping cycle.
    #[must_use]
    pub const fn with_check_mem_cycle(mut self, cycle: usize) -> Self {
        self.check_mem_cycle = cycle;
        self
    }

    /// Sets the default per-file line cap.
    #[must_use]
    pub const fn with_max_lines_per_logfile(mut self, max_lines: usize) -> Self {
        self.max_lines_per_logfile = max_lines;
        self
    }

    /// Checks that the limits are usable.
    ///
    /// # Errors
    ///
    /// Returns [`LogCacheError::InvalidConfig`] for zero limits.
    pub fn validate(&self) -> Result<()> {
        if self.check_mem_cycle == 0 {
            return Err(LogCacheError::InvalidConfig(
                "check_mem_cycle must be positive".to_string(),
            ));
        }
        if self.max_lines_per_logfile == 0 {
            return Err(LogCacheError::InvalidConfig(
                "max_lines_per_logfile must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl MonitoringCore for LogCacheConfig {
    fn history_file(&self) -> PathBuf {
        self.history_file.clone()
    }

    fn history_archive_directory(&self) -> PathBuf {
        self.archive_dir.clone()
    }

    fn max_cached_messages(&self) -> usize {
        self.max_cached_messages
    }

    fn check_mem_cycle(&self) -> usize {
        self.check_mem_cycle
    }
}
