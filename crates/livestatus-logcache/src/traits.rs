//! Traits at the boundaries of the log cache.
//!
//! - [`MonitoringCore`] supplies file locations and memory limits.
//! - [`LogLineObserver`] receives a call for every line a [`Logfile`] loads.
//!
//! [`Logfile`]: crate::logfile::Logfile

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::types::ClassMask;

/// Provider of the monitoring core's history settings.
///
/// The cache keeps a handle to the provider but never calls it during
/// construction: the provider may still be initializing at that point.
/// Methods are consulted on every refresh and scan, so changes take effect
/// on the next cache operation.
pub trait MonitoringCore: Send + Sync {
    /// The history file currently being written to.
    fn history_file(&self) -> PathBuf;

    /// Directory holding rotated history files.
    fn history_archive_directory(&self) -> PathBuf;

    /// Number of loaded log messages above which housekeeping frees entries.
    fn max_cached_messages(&self) -> usize;

    /// Minimum growth of loaded messages between two housekeeping runs.
    fn check_mem_cycle(&self) -> usize {
        1000
    }
}

/// Callback invoked by a log file for every line it loads into memory.
pub trait LogLineObserver {
    /// A line was loaded into the file starting at `logfile_since` while
    /// serving a query for `logclasses`.
    fn log_line_has_been_added(&mut self, logfile_since: DateTime<Utc>, logclasses: ClassMask);
}

/// Counts loaded lines without further bookkeeping.
impl LogLineObserver for usize {
    fn log_line_has_been_added(&mut self, _logfile_since: DateTime<Utc>, _logclasses: ClassMask) {
        *self += 1;
    }
}
