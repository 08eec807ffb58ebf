//! # livestatus-cli
//!
//! `lshistory`, a command-line view of monitoring history log files.
//!
//! Provides commands for:
//! - Listing the history files a query reaching back to a horizon needs
//! - Scanning history entries of a time window, newest first
//!
//! # Architecture
//!
//! Every invocation builds a [`LogCache`](livestatus_logcache::LogCache) from
//! a [`LogCacheConfig`](livestatus_logcache::LogCacheConfig) and runs a single
//! query against it.
//!
//! ```text
//! ┌───────────┐   paths / scan    ┌──────────┐   read    ┌───────────────┐
//! │ lshistory │──────────────────►│ LogCache │──────────►│ history files │
//! └───────────┘                   └──────────┘           └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, PathsArgs, ScanArgs};
pub use error::CliError;
pub use output::OutputFormat;
