//! Core types for history queries.
//!
//! This module provides:
//! - [`LogClass`] — Category of a history log line
//! - [`ClassMask`] — Bitmask selecting relevant categories
//! - [`LogFilter`] — Constraints of a single scan

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::LogEntry;
use crate::error::LogCacheError;

/// Category of a history log line.
///
/// The discriminant is the bit position of the class within a [`ClassMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogClass {
    /// Anything not covered by another class
    Info = 0,
    /// Host and service alerts (state, downtime, flapping, acknowledgement)
    Alert = 1,
    /// Core start, stop and restart messages
    Program = 2,
    /// Host and service notifications
    HsNotification = 3,
    /// Passive check results
    PassiveCheck = 4,
    /// External commands
    ExtCommand = 5,
    /// Initial and current states, timeperiod transitions
    State = 6,
    /// Free text without a message type
    Text = 7,
    /// Alert handler start and stop
    AlertHandlers = 8,
}

impl LogClass {
    /// All classes in bit order.
    pub const ALL: [Self; 9] = [
        Self::Info,
        Self::Alert,
        Self::Program,
        Self::HsNotification,
        Self::PassiveCheck,
        Self::ExtCommand,
        Self::State,
        Self::Text,
        Self::AlertHandlers,
    ];

    /// Returns the single-bit mask of this class.
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    /// Returns the name used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Alert => "alert",
            Self::Program => "program",
            Self::HsNotification => "hs_notification",
            Self::PassiveCheck => "passive_check",
            Self::ExtCommand => "ext_command",
            Self::State => "state",
            Self::Text => "text",
            Self::AlertHandlers => "alert_handlers",
        }
    }
}

impl fmt::Display for LogClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogClass {
    type Err = LogCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "info" => Ok(Self::Info),
            "alert" | "alerts" => Ok(Self::Alert),
            "program" => Ok(Self::Program),
            "hs_notification" | "notification" | "notifications" => Ok(Self::HsNotification),
            "passive_check" | "passive" => Ok(Self::PassiveCheck),
            "ext_command" | "command" | "commands" => Ok(Self::ExtCommand),
            "state" => Ok(Self::State),
            "text" => Ok(Self::Text),
            "alert_handlers" | "alert_handler" => Ok(Self::AlertHandlers),
            _ => Err(LogCacheError::UnknownClass(s.to_string())),
        }
    }
}

/// Bitmask of [`LogClass`]es relevant to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMask(pub u32);

impl ClassMask {
    /// Selects every class.
    pub const ALL: Self = Self(u32::MAX);
    /// Selects nothing.
    pub const NONE: Self = Self(0);

    /// Creates a mask containing exactly the given classes.
    #[must_use]
    pub fn of(classes: &[LogClass]) -> Self {
        classes.iter().fold(Self::NONE, |mask, class| mask.with(*class))
    }

    /// Adds a class to the mask.
    #[must_use]
    pub const fn with(self, class: LogClass) -> Self {
        Self(self.0 | class.bit())
    }

    /// Returns true if the class bit is set.
    #[must_use]
    pub const fn contains(self, class: LogClass) -> bool {
        self.0 & class.bit() != 0
    }

    /// Returns true if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bits set in `self` but not in `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Union of both masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Complement of the mask.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self(!self.0)
    }
}

impl FromStr for ClassMask {
    type Err = LogCacheError;

    /// Parses a comma-separated list of class names; `all` selects everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mask = Self::NONE;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name.eq_ignore_ascii_case("all") {
                return Ok(Self::ALL);
            }
            mask = mask.with(name.parse()?);
        }
        Ok(mask)
    }
}

impl From<LogClass> for ClassMask {
    fn from(class: LogClass) -> Self {
        Self(class.bit())
    }
}

/// Constraints of a single history scan.
///
/// The time window is half-open: `since <= time < until`. No validation
/// happens here; a window with `since >= until` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Upper bound on the lines read from any single log file
    pub max_lines_per_logfile: usize,
    /// Classes relevant to the query
    pub classmask: ClassMask,
    /// Start of the window (inclusive)
    pub since: DateTime<Utc>,
    /// End of the window (exclusive)
    pub until: DateTime<Utc>,
}

impl LogFilter {
    /// Line cap used when none is given.
    pub const DEFAULT_MAX_LINES_PER_LOGFILE: usize = 1_000_000;

    /// Creates a filter over `[since, until)` selecting every class.
    #[must_use]
    pub const fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            max_lines_per_logfile: Self::DEFAULT_MAX_LINES_PER_LOGFILE,
            classmask: ClassMask::ALL,
            since,
            until,
        }
    }

    /// Restricts the filter to the given classes.
    #[must_use]
    pub const fn with_classmask(mut self, classmask: ClassMask) -> Self {
        self.classmask = classmask;
        self
    }

    /// Sets the per-file line cap.
    #[must_use]
    pub const fn with_max_lines_per_logfile(mut self, max_lines: usize) -> Self {
        self.max_lines_per_logfile = max_lines;
        self
    }

    /// Returns true if the window cannot contain any timestamp.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.since >= self.until
    }

    /// Returns true if the timestamp falls inside the window.
    #[must_use]
    pub fn contains_time(&self, time: DateTime<Utc>) -> bool {
        self.since <= time && time < self.until
    }

    /// Checks if an entry matches the window, the class mask and the line cap.
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.contains_time(entry.time)
            && self.classmask.contains(entry.class)
            && entry.lineno <= self.max_lines_per_logfile
    }
}
