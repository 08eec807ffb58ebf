//! Shared fixtures: a temporary monitoring site with history files on disk.

#![allow(dead_code)]

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use livestatus_logcache::{LogCache, LogCacheConfig};
use tempfile::TempDir;

pub const HOUR: i64 = 3600;

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

/// A history line of the given class at `time`.
pub fn alert(time: i64, host: &str) -> String {
    format!("[{time}] HOST ALERT: {host};DOWN;HARD;1;connection refused")
}

pub fn state(time: i64, host: &str) -> String {
    format!("[{time}] CURRENT HOST STATE: {host};UP;HARD;1;ok")
}

pub fn notification(time: i64, host: &str) -> String {
    format!("[{time}] HOST NOTIFICATION: admin;{host};DOWN;notify-by-mail;connection refused")
}

pub struct TestSite {
    pub dir: TempDir,
    pub config: LogCacheConfig,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let archive = dir.path().join("archive");
        fs::create_dir(&archive).expect("create archive dir");
        let config = LogCacheConfig::new(dir.path().join("nagios.log"), archive);
        Self { dir, config }
    }

    pub fn write_archive(&self, name: &str, lines: &[String]) -> PathBuf {
        let path = self.config.archive_dir.join(name);
        fs::write(&path, join(lines)).expect("write archive file");
        path
    }

    pub fn write_history(&self, lines: &[String]) -> PathBuf {
        fs::write(&self.config.history_file, join(lines)).expect("write history file");
        self.config.history_file.clone()
    }

    pub fn append_history(&self, lines: &[String]) {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.config.history_file)
            .expect("open history file");
        file.write_all(join(lines).as_bytes()).expect("append history");
    }

    pub fn cache(&self) -> LogCache {
        LogCache::new(Arc::new(self.config.clone()))
    }

    pub fn cache_with(&self, config: LogCacheConfig) -> LogCache {
        LogCache::new(Arc::new(config))
    }
}

fn join(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Three hour-long files: `[0,1h)` and `[1h,2h)` archived, `[2h,3h)` current.
///
/// Each file holds an alert, a state line and a notification every 10 minutes.
pub fn three_hour_site() -> TestSite {
    let site = TestSite::new();
    site.write_archive("nagios-0.log", &hour_of_lines(0));
    site.write_archive("nagios-1.log", &hour_of_lines(HOUR));
    site.write_history(&hour_of_lines(2 * HOUR));
    site
}

pub fn hour_of_lines(start: i64) -> Vec<String> {
    let mut lines = Vec::new();
    for step in 0..6 {
        let time = start + step * 600;
        lines.push(alert(time, "web01"));
        lines.push(state(time + 1, "web01"));
        lines.push(notification(time + 2, "web01"));
    }
    lines
}
