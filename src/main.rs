//! deplink CLI entry point.
//!
//! Parses arguments, initializes logging, and runs link resolution over
//! the given deployment topology and release metadata documents.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use deplink::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "deplink=debug" } else { "deplink=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.execute() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
