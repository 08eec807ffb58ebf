//! `lshistory` binary entrypoint.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use livestatus_cli::cli::{Cli, Commands};
use livestatus_cli::commands::{PathsCommand, ScanCommand};
use livestatus_cli::output::OutputFormat;
use livestatus_logcache::LogCache;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), livestatus_cli::CliError> {
    let config = cli.load_config()?;
    let max_lines = config.max_lines_per_logfile;
    let cache = LogCache::new(Arc::new(config));

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Paths(args) => {
            PathsCommand::new(&cache).execute(&mut stdout, &format, args)?;
        }
        Commands::Scan(args) => {
            ScanCommand::new(&cache, max_lines).execute(&mut stdout, &format, args)?;
        }
    }

    Ok(())
}
