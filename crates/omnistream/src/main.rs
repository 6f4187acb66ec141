#![forbid(unsafe_code)]

//! # OmniStream
//!
//! Runs the pipeline metrics simulator headlessly and prints the resulting
//! dashboard snapshot.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p omnistream -- --seed 42 --ticks 100 --format json
//! ```

use omnistream::cli::{Cli, Command, LogLevel};
use omnistream::config::Config;
use omnistream::export;
use omnistream::session::run_session;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level());

    let config = Config::from_cli(&cli)?;
    config.validate()?;

    if let Some(Command::Diagnostics) = cli.command {
        println!("{}", config.to_diagnostic_string());
        return Ok(());
    }

    let outcome = run_session(&config);
    println!("{}", export::render(&outcome.snapshot, config.format)?);

    Ok(())
}

/// Logs go to stderr so stdout carries only the snapshot.
fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
