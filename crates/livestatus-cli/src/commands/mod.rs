//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`paths`] - History files reaching back to a horizon
//! - [`scan`] - Filtered history entries, newest first

pub mod paths;
pub mod scan;

pub use paths::PathsCommand;
pub use scan::ScanCommand;
