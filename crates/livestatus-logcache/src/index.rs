//! Read-only view over the time-ordered index of log files.
//!
//! The index maps each file's start timestamp to its [`Logfile`]. A file
//! covers `[its start, start of the next newer file)`; the newest file's range
//! is open-ended.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::logfile::Logfile;

/// The index as stored by the cache.
pub(crate) type LogFileMap = BTreeMap<DateTime<Utc>, Logfile>;

/// Borrowed view of the index, valid while the cache lock is held.
#[derive(Debug, Clone, Copy)]
pub struct LogFiles<'a> {
    logfiles: &'a LogFileMap,
}

impl<'a> LogFiles<'a> {
    pub(crate) const fn new(logfiles: &'a LogFileMap) -> Self {
        Self { logfiles }
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logfiles.len()
    }

    /// Returns true if no file is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logfiles.is_empty()
    }

    /// Files in ascending start order.
    pub fn iter(
        &self,
    ) -> impl DoubleEndedIterator<Item = (DateTime<Utc>, &'a Logfile)> + ExactSizeIterator + use<'a> {
        self.logfiles.iter().map(|(since, logfile)| (*since, logfile))
    }

    /// Start timestamps in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = DateTime<Utc>> + use<'a> {
        self.logfiles.keys().copied()
    }

    /// The file starting exactly at `since`.
    #[must_use]
    pub fn get(&self, since: DateTime<Utc>) -> Option<&'a Logfile> {
        self.logfiles.get(&since)
    }

    /// The most recent file.
    #[must_use]
    pub fn newest(&self) -> Option<&'a Logfile> {
        self.logfiles.values().next_back()
    }

    /// The oldest file.
    #[must_use]
    pub fn oldest(&self) -> Option<&'a Logfile> {
        self.logfiles.values().next()
    }

    /// Paths of files whose range reaches `since` or later, newest first,
    /// plus the path of the first file lying wholly before `since`.
    #[must_use]
    pub fn paths_since(&self, since: DateTime<Utc>) -> (Vec<PathBuf>, Option<PathBuf>) {
        let mut paths = Vec::new();
        let mut range_end: Option<DateTime<Utc>> = None;
        for (start, logfile) in self.logfiles.iter().rev() {
            if range_end.is_some_and(|end| end <= since) {
                return (paths, Some(logfile.path().to_path_buf()));
            }
            paths.push(logfile.path().to_path_buf());
            range_end = Some(*start);
        }
        (paths, None)
    }
}

impl<'a> IntoIterator for LogFiles<'a> {
    type Item = (DateTime<Utc>, &'a Logfile);
    type IntoIter = Box<dyn DoubleEndedIterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
