//! # livestatus-logcache
//!
//! Time-ordered cache over the rotated history log files of a monitoring core.
//!
//! This crate provides:
//!
//! - [`LogCache`] — Thread-safe index of log files keyed by start timestamp
//! - [`LogFiles`] — Read-only view of the index, valid while the lock is held
//! - [`Logfile`] — One history file with lazily loaded entries
//! - [`LogEntry`] — A parsed history line
//! - [`LogFilter`] / [`ClassMask`] — Time window, classes and line cap of a scan
//! - [`MonitoringCore`] — Provider of file locations and memory limits
//! - [`LogCacheConfig`] — Serializable settings implementing [`MonitoringCore`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use livestatus_logcache::{LogCache, LogCacheConfig, LogClass, LogFilter};
//!
//! let config = LogCacheConfig::new("/omd/sites/prod/var/nagios/nagios.log",
//!                                  "/omd/sites/prod/var/nagios/archive");
//! let cache = LogCache::new(Arc::new(config));
//!
//! let now = Utc::now();
//! let (paths, skipped) = cache.paths_since(now - Duration::hours(4));
//! println!("{} files, more history: {}", paths.len(), skipped.is_some());
//!
//! let filter = LogFilter::new(now - Duration::hours(1), now)
//!     .with_classmask(LogClass::Alert.into());
//! let mut alerts = Vec::new();
//! cache.for_each(&filter, |entry| {
//!     alerts.push(entry.message.clone());
//!     alerts.len() < 10
//! });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod logfile;
pub mod traits;
pub mod types;

// Re-export main types
pub use cache::{shared_cache, LogCache, LogCacheGuard, MessageCounters, SharedLogCache};
pub use config::LogCacheConfig;
pub use entry::{LogEntry, LogEntryKind};
pub use error::{LogCacheError, Result};
pub use index::LogFiles;
pub use logfile::Logfile;
pub use traits::{LogLineObserver, MonitoringCore};
pub use types::{ClassMask, LogClass, LogFilter};
