//! A single history log file with lazily loaded entries.
//!
//! Opening a [`Logfile`] reads only its first line to learn the start
//! timestamp. Entries are loaded on demand, per [`LogClass`], when a scan asks
//! for them.
//!
//! ## Line cap
//!
//! [`Logfile::load`] reads at most `max_lines_per_logfile` lines, counted
//! from the start of the file. Lines beyond the cap are ignored and an error
//! is logged, so a truncated file always keeps its *oldest* lines.
//!
//! [`LogClass`]: crate::types::LogClass

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::error;

use crate::entry::LogEntry;
use crate::error::{LogCacheError, Result};
use crate::traits::LogLineObserver;
use crate::types::ClassMask;

/// One rotation period of history, owned by the cache.
#[derive(Debug)]
pub struct Logfile {
    path: PathBuf,
    since: DateTime<Utc>,
    /// Set for the file still being written to.
    watch: bool,
    /// Loaded entries keyed by `(time, lineno)`.
    entries: BTreeMap<(DateTime<Utc>, usize), LogEntry>,
    classes_read: ClassMask,
    lineno: usize,
    /// Byte offset after the last complete line read.
    read_pos: u64,
    /// Line cap at which the last read stopped early.
    truncated_at: Option<usize>,
}

impl Logfile {
    /// Opens a log file and reads its start timestamp.
    ///
    /// `watch` marks the file that is still growing; its later loads also pick
    /// up lines appended since the previous load.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its first line has no
    /// timestamp.
    pub fn open(path: impl Into<PathBuf>, watch: bool) -> Result<Self> {
        let path = path.into();
        let since = Self::read_since(&path)?;
        Ok(Self {
            path,
            since,
            watch,
            entries: BTreeMap::new(),
            classes_read: ClassMask::NONE,
            lineno: 0,
            read_pos: 0,
            truncated_at: None,
        })
    }

    /// Reads the timestamp of the first line of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its first line has no
    /// timestamp.
    pub fn read_since(path: &Path) -> Result<DateTime<Utc>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut first = Vec::new();
        reader.read_until(b'\n', &mut first)?;
        LogEntry::timestamp_of(&String::from_utf8_lossy(&first))
            .ok_or_else(|| LogCacheError::NoTimestamp(path.to_path_buf()))
    }

    /// Path of the file on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp of the first line.
    #[must_use]
    pub const fn since(&self) -> DateTime<Utc> {
        self.since
    }

    /// Returns true for the file still being written to.
    #[must_use]
    pub const fn is_watched(&self) -> bool {
        self.watch
    }

    /// Classes whose entries are currently loaded.
    #[must_use]
    pub const fn classes_read(&self) -> ClassMask {
        self.classes_read
    }

    /// Number of loaded entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Loaded entries in ascending `(time, lineno)` order.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + '_ {
        self.entries.values()
    }

    /// Makes sure all entries of `logclasses` are loaded.
    ///
    /// Classes not read yet are loaded by rereading the file from the start.
    /// A watched file additionally continues reading already loaded classes
    /// from where the previous load stopped. A file cut off at a smaller line
    /// cap than `max_lines_per_logfile` is reread from the start. Every newly
    /// stored line is reported to `observer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read. Entries loaded before the
    /// failure stay in memory.
    pub fn load(
        &mut self,
        max_lines_per_logfile: usize,
        logclasses: ClassMask,
        observer: &mut dyn LogLineObserver,
    ) -> Result<()> {
        // Lines past an earlier, smaller cap were never read.
        let reread = self
            .truncated_at
            .is_some_and(|cap| max_lines_per_logfile > cap);
        let missing = if reread {
            self.classes_read.union(logclasses)
        } else {
            logclasses.without(self.classes_read)
        };
        if !self.watch && missing.is_empty() {
            return Ok(());
        }

        let mut reader = BufReader::new(File::open(&self.path)?);

        if self.watch && !reread && !self.classes_read.is_empty() {
            reader.seek(SeekFrom::Start(self.read_pos))?;
            let classes = self.classes_read;
            self.load_range(&mut reader, classes, logclasses, max_lines_per_logfile, observer)?;
        }

        if !missing.is_empty() {
            reader.seek(SeekFrom::Start(0))?;
            self.lineno = 0;
            self.read_pos = 0;
            self.truncated_at = None;
            self.load_range(&mut reader, missing, logclasses, max_lines_per_logfile, observer)?;
            self.classes_read = self.classes_read.union(missing);
        }

        Ok(())
    }

    /// Drops loaded entries of the given classes, returning how many.
    pub fn free_messages(&mut self, logclasses: ClassMask) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !logclasses.contains(entry.class));
        self.classes_read = self.classes_read.without(logclasses);
        before - self.entries.len()
    }

    fn load_range<R: BufRead>(
        &mut self,
        reader: &mut R,
        classes: ClassMask,
        logclasses: ClassMask,
        max_lines_per_logfile: usize,
        observer: &mut dyn LogLineObserver,
    ) -> Result<()> {
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }
            // The writer has not finished this line yet.
            if self.watch && buffer.last() != Some(&b'\n') {
                break;
            }
            if self.lineno >= max_lines_per_logfile {
                error!(
                    path = %self.path.display(),
                    max_lines = max_lines_per_logfile,
                    "too many lines in log file, ignoring the rest"
                );
                self.truncated_at = Some(max_lines_per_logfile);
                break;
            }
            self.lineno += 1;
            self.read_pos += read as u64;

            let line = String::from_utf8_lossy(&buffer);
            if self.process_log_line(self.lineno, &line, classes) {
                observer.log_line_has_been_added(self.since, logclasses);
            }
        }
        Ok(())
    }

    fn process_log_line(&mut self, lineno: usize, line: &str, classes: ClassMask) -> bool {
        let Some(entry) = LogEntry::parse(lineno, line) else {
            return false;
        };
        if !classes.contains(entry.class) {
            return false;
        }
        match self.entries.entry((entry.time, lineno)) {
            // Already stored by an earlier, truncated read.
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }
}
