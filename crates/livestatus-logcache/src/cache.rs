//! The shared, time-ordered cache of history log files.
//!
//! [`LogCache`] keeps an index of every rotated history file plus the file the
//! monitoring core is still writing to, keyed by start timestamp. One mutex
//! serializes all access: every operation first refreshes the index and then
//! runs against a view that cannot change until the lock is released.
//!
//! Callbacks passed to [`LogCache::apply`] and [`LogCache::for_each`] run
//! while the lock is held. Calling back into the same cache from inside them
//! deadlocks.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::entry::LogEntry;
use crate::error::LogCacheError;
use crate::index::{LogFileMap, LogFiles};
use crate::logfile::Logfile;
use crate::traits::{LogLineObserver, MonitoringCore};
use crate::types::{ClassMask, LogFilter};

/// Thread-safe handle to a log cache.
pub type SharedLogCache = Arc<LogCache>;

/// Creates a shared log cache.
#[must_use]
pub fn shared_cache(core: Arc<dyn MonitoringCore>) -> SharedLogCache {
    Arc::new(LogCache::new(core))
}

// ============================================================================
// Counters
// ============================================================================

/// Bookkeeping of loaded log messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounters {
    /// Messages currently loaded across all files
    pub num_cached_log_messages: usize,
    /// Value of `num_cached_log_messages` after the last housekeeping run
    pub num_at_last_check: usize,
}

impl MessageCounters {
    /// Returns true when the limit is exceeded and the count has grown by at
    /// least `check_mem_cycle` since the last housekeeping run.
    #[must_use]
    pub fn housekeeping_due(&self, max_cached_messages: usize, check_mem_cycle: usize) -> bool {
        self.num_cached_log_messages > max_cached_messages
            && self.num_cached_log_messages
                >= self.num_at_last_check.saturating_add(check_mem_cycle)
    }

    fn freed(&mut self, count: usize) {
        self.num_cached_log_messages = self.num_cached_log_messages.saturating_sub(count);
    }
}

impl LogLineObserver for MessageCounters {
    fn log_line_has_been_added(&mut self, _logfile_since: DateTime<Utc>, _logclasses: ClassMask) {
        self.num_cached_log_messages += 1;
    }
}

// ============================================================================
// State behind the lock
// ============================================================================

#[derive(Debug, Default)]
struct CacheState {
    logfiles: LogFileMap,
    counters: MessageCounters,
    last_index_update: Option<DateTime<Utc>>,
    /// Key of the watched history file.
    current: Option<DateTime<Utc>>,
    /// Indexed archive files and their keys.
    archived: HashMap<PathBuf, DateTime<Utc>>,
    /// Archive files that can never be indexed.
    ignored: HashSet<PathBuf>,
    /// Start of a history file rejected as a duplicate key.
    rejected_history: Option<DateTime<Utc>>,
}

impl CacheState {
    fn update(&mut self, core: &dyn MonitoringCore) {
        let history_file = core.history_file();
        let mut changed = self.update_archive(&core.history_archive_directory(), &history_file);
        changed |= self.update_history_file(&history_file);

        if changed {
            self.last_index_update = Some(Utc::now());
            info!(
                files = self.logfiles.len(),
                cached_messages = self.counters.num_cached_log_messages,
                "log file index updated"
            );
        }
        if self.logfiles.is_empty() {
            debug!(history_file = %history_file.display(), "no log files indexed");
        }
    }

    fn update_archive(&mut self, archive_dir: &Path, history_file: &Path) -> bool {
        let listed = match list_files(archive_dir, history_file) {
            Ok(listed) => listed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %archive_dir.display(), "no log archive directory");
                return false;
            }
            Err(e) => {
                warn!(dir = %archive_dir.display(), error = %e, "cannot list log archive");
                return false;
            }
        };

        // Indexed files stay even when they vanish from disk; loading them
        // later fails and the scan skips them.
        let mut changed = false;
        self.ignored.retain(|path| listed.contains(path));

        for path in listed {
            if self.archived.contains_key(&path) || self.ignored.contains(&path) {
                continue;
            }
            match Logfile::open(&path, false) {
                Ok(logfile) => changed |= self.add_archived(path, logfile),
                Err(LogCacheError::NoTimestamp(_)) => {
                    warn!(path = %path.display(), "ignoring log file without timestamp");
                    self.ignored.insert(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot open log file, skipping");
                }
            }
        }

        changed
    }

    fn add_archived(&mut self, path: PathBuf, logfile: Logfile) -> bool {
        let since = logfile.since();
        if self.current == Some(since) {
            // The watched file has been rotated into the archive.
            self.remove_logfile(since);
            self.current = None;
        } else if self.logfiles.contains_key(&since) {
            warn!(path = %path.display(), since = %since, "ignoring duplicate log file");
            self.ignored.insert(path);
            return false;
        }
        self.logfiles.insert(since, logfile);
        self.archived.insert(path, since);
        true
    }

    fn update_history_file(&mut self, history_file: &Path) -> bool {
        let logfile = match Logfile::open(history_file, true) {
            Ok(logfile) => logfile,
            Err(e) => {
                debug!(path = %history_file.display(), error = %e, "history file not available");
                return false;
            }
        };
        let since = logfile.since();
        if self.current == Some(since) {
            return false;
        }

        let mut changed = false;
        if let Some(stale) = self.current.take() {
            self.remove_logfile(stale);
            changed = true;
        }
        if self.logfiles.contains_key(&since) {
            if self.rejected_history == Some(since) {
                debug!(path = %history_file.display(), since = %since, "ignoring duplicate log file");
            } else {
                warn!(path = %history_file.display(), since = %since, "ignoring duplicate log file");
                self.rejected_history = Some(since);
            }
            return changed;
        }
        self.logfiles.insert(since, logfile);
        self.current = Some(since);
        self.rejected_history = None;
        true
    }

    fn remove_logfile(&mut self, since: DateTime<Utc>) {
        if let Some(logfile) = self.logfiles.remove(&since) {
            self.counters.freed(logfile.size());
        }
    }

    fn for_each<F>(&mut self, core: &dyn MonitoringCore, filter: &LogFilter, mut predicate: F)
    where
        F: FnMut(&LogEntry) -> bool,
    {
        if self.logfiles.is_empty() || filter.is_empty() {
            return;
        }

        let max_cached_messages = core.max_cached_messages();
        let check_mem_cycle = core.check_mem_cycle();
        let candidates: Vec<DateTime<Utc>> =
            self.logfiles.range(..filter.until).rev().map(|(since, _)| *since).collect();

        for since in candidates {
            let Some(logfile) = self.logfiles.get_mut(&since) else {
                continue;
            };
            if let Err(e) =
                logfile.load(filter.max_lines_per_logfile, filter.classmask, &mut self.counters)
            {
                warn!(path = %logfile.path().display(), error = %e, "cannot load log file");
            }
            if self
                .counters
                .housekeeping_due(max_cached_messages, check_mem_cycle)
            {
                self.housekeeping(since, filter.classmask, max_cached_messages);
            }

            let Some(logfile) = self.logfiles.get(&since) else {
                continue;
            };
            for entry in logfile.entries().rev() {
                if entry.time < filter.since {
                    return;
                }
                if !filter.matches(entry) {
                    continue;
                }
                if !predicate(entry) {
                    return;
                }
            }
        }
    }

    /// Frees loaded entries until the count is back within the limit.
    ///
    /// Files older than `current` go first, oldest first. Then entries of
    /// classes outside `logclasses` from `current` and newer files, and
    /// finally everything loaded from files newer than `current`.
    fn housekeeping(&mut self, current: DateTime<Utc>, logclasses: ClassMask, limit: usize) {
        let before = self.counters.num_cached_log_messages;
        let counters = &mut self.counters;

        'free: {
            for (_, logfile) in self.logfiles.range_mut(..current) {
                if counters.num_cached_log_messages <= limit {
                    break 'free;
                }
                counters.freed(logfile.free_messages(ClassMask::ALL));
            }
            for (_, logfile) in self.logfiles.range_mut(current..) {
                if counters.num_cached_log_messages <= limit {
                    break 'free;
                }
                counters.freed(logfile.free_messages(logclasses.complement()));
            }
            for (since, logfile) in self.logfiles.range_mut(current..) {
                if counters.num_cached_log_messages <= limit {
                    break 'free;
                }
                if *since > current {
                    counters.freed(logfile.free_messages(ClassMask::ALL));
                }
            }
        }

        counters.num_at_last_check = counters.num_cached_log_messages;
        debug!(
            freed = before - counters.num_cached_log_messages,
            remaining = counters.num_cached_log_messages,
            limit,
            "freed cached log messages"
        );
    }
}

/// Regular files in `dir`, sorted, without the watched history file.
fn list_files(dir: &Path, history_file: &Path) -> io::Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read archive entry");
                continue;
            }
        };
        if path.is_file() && path != history_file {
            files.insert(path);
        }
    }
    Ok(files)
}

// ============================================================================
// Public API
// ============================================================================

/// Time-ordered cache of history log files.
///
/// Construction does not touch the [`MonitoringCore`]; the first operation
/// builds the index.
pub struct LogCache {
    core: Arc<dyn MonitoringCore>,
    state: Mutex<CacheState>,
}

impl fmt::Debug for LogCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCache").finish_non_exhaustive()
    }
}

impl LogCache {
    /// Creates an empty cache backed by `core`.
    #[must_use]
    pub fn new(core: Arc<dyn MonitoringCore>) -> Self {
        Self {
            core,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Acquires the lock and refreshes the index.
    ///
    /// The index stays unchanged until the guard is dropped.
    pub fn lock(&self) -> LogCacheGuard<'_> {
        let mut state = self.state.lock();
        state.update(self.core.as_ref());
        LogCacheGuard {
            state,
            core: self.core.as_ref(),
        }
    }

    /// Runs `f` on a refreshed view of the index, holding the lock.
    pub fn apply<F, R>(&self, f: F) -> R
    where
        F: FnOnce(LogFiles<'_>) -> R,
    {
        let guard = self.lock();
        f(guard.files())
    }

    /// Brings the index up to date with the files on disk.
    ///
    /// Only files not indexed yet are opened, so repeated calls without
    /// changes on disk are cheap and leave the index untouched.
    pub fn update(&self) {
        self.state.lock().update(self.core.as_ref());
    }

    /// Paths of files reaching `since` or later, newest first, plus the path
    /// of the first older file that was left out.
    pub fn paths_since(&self, since: DateTime<Utc>) -> (Vec<PathBuf>, Option<PathBuf>) {
        self.lock().paths_since(since)
    }

    /// Feeds matching entries to `predicate`, newest first, until it returns
    /// `false`.
    pub fn for_each<F>(&self, filter: &LogFilter, predicate: F)
    where
        F: FnMut(&LogEntry) -> bool,
    {
        self.lock().for_each(filter, predicate);
    }

    /// Records a line loaded into the file starting at `logfile_since`.
    pub fn log_line_has_been_added(&self, logfile_since: DateTime<Utc>, logclasses: ClassMask) {
        self.state
            .lock()
            .counters
            .log_line_has_been_added(logfile_since, logclasses);
    }

    /// Current message counters, without refreshing.
    #[must_use]
    pub fn counters(&self) -> MessageCounters {
        self.state.lock().counters
    }

    /// When the index last changed, without refreshing.
    #[must_use]
    pub fn last_index_update(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_index_update
    }
}

/// Exclusive access to a [`LogCache`]; the lock is released on drop.
pub struct LogCacheGuard<'a> {
    state: MutexGuard<'a, CacheState>,
    core: &'a dyn MonitoringCore,
}

impl fmt::Debug for LogCacheGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCacheGuard")
            .field("files", &self.state.logfiles.len())
            .field("counters", &self.state.counters)
            .finish_non_exhaustive()
    }
}

impl LogCacheGuard<'_> {
    /// Read-only view of the index.
    #[must_use]
    pub fn files(&self) -> LogFiles<'_> {
        LogFiles::new(&self.state.logfiles)
    }

    /// See [`LogCache::paths_since`].
    #[must_use]
    pub fn paths_since(&self, since: DateTime<Utc>) -> (Vec<PathBuf>, Option<PathBuf>) {
        self.files().paths_since(since)
    }

    /// See [`LogCache::for_each`].
    pub fn for_each<F>(&mut self, filter: &LogFilter, predicate: F)
    where
        F: FnMut(&LogEntry) -> bool,
    {
        self.state.for_each(self.core, filter, predicate);
    }

    /// See [`LogCache::log_line_has_been_added`].
    pub fn log_line_has_been_added(&mut self, logfile_since: DateTime<Utc>, logclasses: ClassMask) {
        self.state
            .counters
            .log_line_has_been_added(logfile_since, logclasses);
    }

    /// Current message counters.
    #[must_use]
    pub fn counters(&self) -> MessageCounters {
        self.state.counters
    }

    /// When the index last changed.
    #[must_use]
    pub fn last_index_update(&self) -> Option<DateTime<Utc>> {
        self.state.last_index_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogCacheConfig;
    use crate::types::LogClass;
    use std::fmt::Write as _;
    use tempfile::TempDir;

    struct Site {
        dir: TempDir,
        config: LogCacheConfig,
    }

    impl Site {
        fn new() -> Self {
            let dir = TempDir::new().expect("create temp dir");
            let archive = dir.path().join("archive");
            fs::create_dir(&archive).expect("create archive dir");
            let config = LogCacheConfig::new(dir.path().join("nagios.log"), archive);
            Self { dir, config }
        }

        fn archive(&self, name: &str, start: i64, lines: usize) -> PathBuf {
            let path = self.config.archive_dir.join(name);
            fs::write(&path, history(start, lines)).expect("write archive file");
            path
        }

        fn history(&self, start: i64, lines: usize) -> PathBuf {
            let path = self.config.history_file.clone();
            fs::write(&path, history(start, lines)).expect("write history file");
            path
        }

        fn cache(&self) -> LogCache {
            LogCache::new(Arc::new(self.config.clone()))
        }
    }

    fn history(start: i64, lines: usize) -> String {
        let mut out = String::new();
        for i in 0..lines {
            let time = start + i64::try_from(i).expect("small line count");
            let _ = writeln!(out, "[{time}] HOST ALERT: host{i};DOWN;HARD;1;down");
        }
        out
    }

    fn keys(cache: &LogCache) -> Vec<i64> {
        cache.apply(|files| files.keys().map(|k| k.timestamp()).collect())
    }

    struct PanickingCore;

    impl MonitoringCore for PanickingCore {
        fn history_file(&self) -> PathBuf {
            unreachable!("core consulted during construction")
        }

        fn history_archive_directory(&self) -> PathBuf {
            unreachable!("core consulted during construction")
        }

        fn max_cached_messages(&self) -> usize {
            unreachable!("core consulted during construction")
        }
    }

    #[test]
    fn construction_does_not_consult_core() {
        let cache = LogCache::new(Arc::new(PanickingCore));
        assert!(cache.last_index_update().is_none());
        assert_eq!(cache.counters(), MessageCounters::default());
    }

    #[test]
    fn counters_housekeeping_due() {
        let mut counters = MessageCounters::default();
        assert!(!counters.housekeeping_due(2, 1));

        for _ in 0..3 {
            counters.log_line_has_been_added(Utc::now(), ClassMask::ALL);
        }
        assert!(counters.housekeeping_due(2, 1));
        assert!(!counters.housekeeping_due(2, 4));
        assert!(!counters.housekeeping_due(3, 1));

        counters.num_at_last_check = 3;
        assert!(!counters.housekeeping_due(2, 1));

        counters.freed(10);
        assert_eq!(counters.num_cached_log_messages, 0);
    }

    #[test]
    fn update_indexes_archive_and_history_file() {
        let site = Site::new();
        site.archive("a.log", 0, 2);
        site.archive("b.log", 3600, 2);
        site.history(7200, 2);

        let cache = site.cache();
        assert_eq!(keys(&cache), vec![0, 3600, 7200]);
        let watched = cache.apply(|files| files.newest().map(Logfile::is_watched));
        assert_eq!(watched, Some(true));
        assert!(cache.last_index_update().is_some());
    }

    #[test]
    fn update_is_idempotent() {
        let site = Site::new();
        site.archive("a.log", 0, 2);
        site.history(3600, 2);

        let cache = site.cache();
        cache.update();
        let stamp = cache.last_index_update();
        cache.update();
        cache.update();

        assert_eq!(keys(&cache), vec![0, 3600]);
        assert_eq!(cache.last_index_update(), stamp);
    }

    #[test]
    fn update_skips_invalid_and_duplicate_files() {
        let site = Site::new();
        site.archive("a.log", 0, 2);
        site.archive("b.log", 0, 3);
        fs::write(site.config.archive_dir.join("junk.txt"), "no timestamp\n")
            .expect("write junk");
        fs::create_dir(site.config.archive_dir.join("subdir")).expect("create subdir");

        let cache = site.cache();
        assert_eq!(keys(&cache), vec![0]);
        let stamp = cache.last_index_update();
        cache.update();
        assert_eq!(cache.last_index_update(), stamp);
    }

    #[test]
    fn update_tolerates_missing_locations() {
        let dir = TempDir::new().expect("create temp dir");
        let config = LogCacheConfig::new(dir.path().join("nagios.log"), dir.path().join("none"));
        let cache = LogCache::new(Arc::new(config));

        assert!(keys(&cache).is_empty());
        assert!(cache.last_index_update().is_none());
        assert_eq!(cache.paths_since(Utc::now()), (Vec::new(), None));
    }

    #[test]
    fn update_follows_rotation() {
        let site = Site::new();
        site.history(0, 3);
        let cache = site.cache();

        let mut seen = 0;
        cache.for_each(&LogFilter::new(DateTime::UNIX_EPOCH, Utc::now()), |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 3);
        assert_eq!(cache.counters().num_cached_log_messages, 3);

        fs::rename(&site.config.history_file, site.config.archive_dir.join("nagios-0.log"))
            .expect("rotate");
        site.history(3600, 1);

        assert_eq!(keys(&cache), vec![0, 3600]);
        let watched: Vec<bool> =
            cache.apply(|files| files.iter().map(|(_, l)| l.is_watched()).collect());
        assert_eq!(watched, vec![false, true]);
        assert_eq!(cache.counters().num_cached_log_messages, 0);
    }

    #[test]
    fn update_keeps_vanished_archive_files_indexed() {
        let site = Site::new();
        let loaded = site.archive("a.log", 0, 3);
        site.archive("b.log", 3600, 2);
        let unloaded = site.archive("c.log", 7200, 1);
        let cache = site.cache();
        assert_eq!(keys(&cache), vec![0, 3600, 7200]);

        let until = DateTime::from_timestamp(7200, 0).expect("valid timestamp");
        let filter = LogFilter::new(DateTime::UNIX_EPOCH, until);
        let scan = |cache: &LogCache| {
            let mut seen = 0;
            cache.for_each(&filter, |_| {
                seen += 1;
                true
            });
            seen
        };
        assert_eq!(scan(&cache), 5);
        let stamp = cache.last_index_update();

        fs::remove_file(loaded).expect("remove loaded archive file");
        fs::remove_file(unloaded).expect("remove unloaded archive file");
        assert_eq!(keys(&cache), vec![0, 3600, 7200]);
        assert_eq!(cache.last_index_update(), stamp);
        assert_eq!(scan(&cache), 5);

        let mut seen = 0;
        cache.for_each(&LogFilter::new(DateTime::UNIX_EPOCH, Utc::now()), |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 5);
    }

    #[test]
    fn update_remembers_history_file_with_duplicate_start() {
        let site = Site::new();
        site.archive("a.log", 0, 2);
        site.history(0, 3);

        let cache = site.cache();
        assert_eq!(keys(&cache), vec![0]);
        let watched = cache.apply(|files| files.newest().map(Logfile::is_watched));
        assert_eq!(watched, Some(false));
        assert_eq!(cache.state.lock().rejected_history, DateTime::from_timestamp(0, 0));

        let stamp = cache.last_index_update();
        cache.update();
        cache.update();
        assert_eq!(cache.last_index_update(), stamp);
        assert_eq!(cache.state.lock().rejected_history, DateTime::from_timestamp(0, 0));

        site.history(3600, 1);
        assert_eq!(keys(&cache), vec![0, 3600]);
        assert!(cache.state.lock().rejected_history.is_none());
    }

    #[test]
    fn for_each_on_empty_index_is_noop() {
        let site = Site::new();
        let cache = site.cache();
        let mut called = false;
        cache.for_each(&LogFilter::new(DateTime::UNIX_EPOCH, Utc::now()), |_| {
            called = true;
            true
        });
        assert!(!called);
    }

    #[test]
    fn for_each_with_inverted_window_matches_nothing() {
        let site = Site::new();
        site.archive("a.log", 0, 5);
        let cache = site.cache();

        let since = DateTime::from_timestamp(4, 0).expect("valid timestamp");
        let until = DateTime::from_timestamp(1, 0).expect("valid timestamp");
        let mut called = false;
        cache.for_each(&LogFilter::new(since, until), |_| {
            called = true;
            true
        });
        assert!(!called);
    }

    #[test]
    fn for_each_skips_files_starting_after_until() {
        let site = Site::new();
        site.archive("a.log", 0, 2);
        site.archive("b.log", 3600, 2);
        let cache = site.cache();

        let until = DateTime::from_timestamp(3600, 0).expect("valid timestamp");
        let mut times = Vec::new();
        cache.for_each(&LogFilter::new(DateTime::UNIX_EPOCH, until), |entry| {
            times.push(entry.time.timestamp());
            true
        });

        assert_eq!(times, vec![1, 0]);
        let sizes: Vec<usize> = cache.apply(|files| files.iter().map(|(_, l)| l.size()).collect());
        assert_eq!(sizes, vec![2, 0]);
    }

    #[test]
    fn housekeeping_frees_files_newer_than_the_one_loading() {
        let site = Site::new();
        site.archive("a.log", 0, 4);
        site.archive("b.log", 3600, 4);
        site.archive("c.log", 7200, 4);
        let config = site.config.clone().with_max_cached_messages(3).with_check_mem_cycle(1);
        let cache = LogCache::new(Arc::new(config));

        let mut seen = 0;
        cache.for_each(&LogFilter::new(DateTime::UNIX_EPOCH, Utc::now()), |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 12);

        let sizes: Vec<usize> = cache.apply(|files| files.iter().map(|(_, l)| l.size()).collect());
        assert_eq!(sizes, vec![4, 0, 0]);
        let counters = cache.counters();
        assert_eq!(counters.num_cached_log_messages, 4);
        assert_eq!(counters.num_at_last_check, 4);
    }

    #[test]
    fn housekeeping_prefers_irrelevant_classes() {
        let site = Site::new();
        let path = site.config.archive_dir.join("mixed.log");
        fs::write(
            &path,
            "[10] CURRENT HOST STATE: h;UP;HARD;1;ok\n\
             [11] CURRENT HOST STATE: h;UP;HARD;1;ok\n\
             [12] HOST ALERT: h;DOWN;HARD;1;down\n",
        )
        .expect("write archive file");
        let config = site.config.clone().with_max_cached_messages(1).with_check_mem_cycle(1);
        let cache = LogCache::new(Arc::new(config));

        let window = LogFilter::new(DateTime::UNIX_EPOCH, Utc::now());
        cache.for_each(&window.with_classmask(LogClass::State.into()), |_| true);
        assert_eq!(cache.counters().num_cached_log_messages, 2);

        let mut alerts = 0;
        cache.for_each(&window.with_classmask(LogClass::Alert.into()), |_| {
            alerts += 1;
            true
        });
        assert_eq!(alerts, 1);

        let classes = cache.apply(|files| files.oldest().map(Logfile::classes_read));
        assert_eq!(classes, Some(ClassMask::from(LogClass::Alert)));
        assert_eq!(cache.counters().num_cached_log_messages, 1);
    }

    #[test]
    fn guard_exposes_consistent_view() {
        let site = Site::new();
        site.archive("a.log", 0, 2);
        site.history(3600, 2);
        let cache = site.cache();

        let mut guard = cache.lock();
        assert_eq!(guard.files().len(), 2);
        let (paths, skipped) = guard.paths_since(DateTime::UNIX_EPOCH);
        assert_eq!(paths.len(), 2);
        assert!(skipped.is_none());

        let mut newest = None;
        guard.for_each(&LogFilter::new(DateTime::UNIX_EPOCH, Utc::now()), |entry| {
            newest = Some(entry.time.timestamp());
            false
        });
        assert_eq!(newest, Some(3601));
        assert_eq!(guard.counters().num_cached_log_messages, 2);

        guard.log_line_has_been_added(Utc::now(), ClassMask::ALL);
        assert_eq!(guard.counters().num_cached_log_messages, 3);
        assert!(guard.last_index_update().is_some());
        drop(guard);

        cache.log_line_has_been_added(Utc::now(), ClassMask::ALL);
        assert_eq!(cache.counters().num_cached_log_messages, 4);
    }

    #[test]
    fn shared_cache_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LogCache>();

        let site = Site::new();
        let cache = shared_cache(Arc::new(site.config.clone()));
        let clone = Arc::clone(&cache);
        assert!(Arc::ptr_eq(&cache, &clone));
        assert!(format!("{cache:?}").contains("LogCache"));
        drop(site.dir);
    }
}
