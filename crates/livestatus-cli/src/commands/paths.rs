//! Paths command implementation.
//!
//! Lists the history files needed to answer a query reaching back to a
//! horizon.

use std::io::Write;

use chrono::{DateTime, Utc};
use livestatus_logcache::LogCache;
use serde::Serialize;
use tracing::debug;

use crate::cli::PathsArgs;
use crate::error::CliError;
use crate::output::{format_time, OutputFormat, TableDisplay};

/// Handler for the paths command.
pub struct PathsCommand<'a> {
    cache: &'a LogCache,
}

impl<'a> PathsCommand<'a> {
    /// Creates a new paths command handler.
    #[must_use]
    pub const fn new(cache: &'a LogCache) -> Self {
        Self { cache }
    }

    /// Executes the paths command.
    ///
    /// # Errors
    ///
    /// Returns error if writing the output fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &PathsArgs,
    ) -> Result<(), CliError> {
        let (paths, skipped) = self.cache.paths_since(args.since);
        debug!(since = %args.since, files = paths.len(), "listed history files");

        let output = PathsOutput {
            since: args.since,
            paths: paths.iter().map(|p| p.display().to_string()).collect(),
            skipped: skipped.map(|p| p.display().to_string()),
        };
        format.write(out, &output)
    }
}

/// Paths output.
#[derive(Debug, Clone, Serialize)]
pub struct PathsOutput {
    /// Requested horizon.
    pub since: DateTime<Utc>,
    /// Files newest first.
    pub paths: Vec<String>,
    /// First older file left out, if any.
    pub skipped: Option<String>,
}

impl TableDisplay for PathsOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "History since {}", format_time(self.since))?;
        writeln!(writer, "══════════════════════════════════")?;
        if self.paths.is_empty() {
            writeln!(writer, "No history files found.")?;
        }
        for path in &self.paths {
            writeln!(writer, "  {path}")?;
        }
        writeln!(writer)?;
        match &self.skipped {
            Some(path) => writeln!(writer, "Older history: {path}")?,
            None => writeln!(writer, "Older history: none")?,
        }
        Ok(())
    }
}
