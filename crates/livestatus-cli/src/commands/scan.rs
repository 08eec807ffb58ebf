//! Scan command implementation.
//!
//! Prints history entries of a time window, newest first.

use std::io::Write;

use chrono::{DateTime, Utc};
use livestatus_logcache::{LogCache, LogEntry, LogFilter};
use serde::Serialize;
use tracing::debug;

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{format_time, OutputFormat, TableDisplay};

/// Handler for the scan command.
pub struct ScanCommand<'a> {
    cache: &'a LogCache,
    default_max_lines: usize,
}

impl<'a> ScanCommand<'a> {
    /// Creates a new scan command handler.
    ///
    /// `default_max_lines` applies when `--max-lines` is not given.
    #[must_use]
    pub const fn new(cache: &'a LogCache, default_max_lines: usize) -> Self {
        Self {
            cache,
            default_max_lines,
        }
    }

    /// Builds the filter for the given arguments.
    ///
    /// # Errors
    ///
    /// Returns error if the line cap is zero.
    pub fn filter(&self, args: &ScanArgs) -> Result<LogFilter, CliError> {
        let max_lines = args.max_lines.unwrap_or(self.default_max_lines);
        if max_lines == 0 {
            return Err(CliError::InvalidArgument(
                "--max-lines must be positive".into(),
            ));
        }
        let until = args.until.unwrap_or_else(Utc::now);
        Ok(LogFilter::new(args.since, until)
            .with_classmask(args.classes)
            .with_max_lines_per_logfile(max_lines))
    }

    /// Executes the scan command.
    ///
    /// # Errors
    ///
    /// Returns error if the arguments are invalid or writing fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &ScanArgs,
    ) -> Result<(), CliError> {
        let filter = self.filter(args)?;
        let limit = args.limit.unwrap_or(usize::MAX);

        let mut entries = Vec::new();
        if limit > 0 {
            self.cache.for_each(&filter, |entry| {
                entries.push(entry.clone());
                entries.len() < limit
            });
        }
        debug!(entries = entries.len(), limit, "history scan finished");

        let output = ScanOutput {
            since: filter.since,
            until: filter.until,
            entries,
        };
        format.write(out, &output)
    }
}

/// Scan output.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutput {
    /// Start of the window.
    pub since: DateTime<Utc>,
    /// End of the window.
    pub until: DateTime<Utc>,
    /// Matching entries, newest first.
    pub entries: Vec<LogEntry>,
}

impl TableDisplay for ScanOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.entries.is_empty() {
            writeln!(writer, "No history entries found.")?;
            return Ok(());
        }

        writeln!(writer, "{:<20}  {:<15}  MESSAGE", "TIME", "CLASS")?;
        writeln!(writer, "{}", "─".repeat(60))?;
        for entry in &self.entries {
            writeln!(
                writer,
                "{:<20}  {:<15}  {}",
                format_time(entry.time),
                entry.class.as_str(),
                entry.text()
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "{} entries", self.entries.len())?;
        Ok(())
    }
}
