//! Command-line interface for `omnistream`.
//!
//! Defines the CLI contract using clap derive macros.
//!
//! # Examples
//!
//! ```bash
//! # Simulate ten ticks two seconds apart and print a text snapshot
//! omnistream
//!
//! # Reproducible run as JSON
//! omnistream --seed 42 --start 2024-01-01T09:30:00Z --ticks 100 --format json
//!
//! # Tune the simulator from a file
//! omnistream --config sim.json
//!
//! # Show the resolved configuration
//! omnistream diagnostics
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// OmniStream - simulated multi-source data pipeline metrics.
///
/// Runs the metrics simulator headlessly against a simulated clock and
/// prints the resulting dashboard snapshot.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "omnistream",
    author,
    version,
    about = "OmniStream - simulated data pipeline metrics",
    long_about = "Runs the OmniStream metrics simulator against a simulated clock \
                  and prints the resulting dashboard snapshot."
)]
pub struct Cli {
    /// Seed for deterministic simulation
    ///
    /// Using the same seed and start time produces identical output
    #[arg(long, short = 's', env = "OMNISTREAM_SEED")]
    pub seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, short = 'n', default_value_t = 10)]
    pub ticks: u32,

    /// Simulated seconds between ticks
    #[arg(long, default_value_t = 2.0)]
    pub interval: f64,

    /// Simulated session start (RFC 3339), defaults to now
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// Path to a JSON file with simulation tuning
    #[arg(long, short = 'c', env = "OMNISTREAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Optional subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the resolved configuration
    Diagnostics,
}

/// Snapshot output formats.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Get log level based on verbosity.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Log level for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Only show warnings and errors
    Warn,
    /// Show info messages
    Info,
    /// Show debug messages
    Debug,
    /// Show all messages including trace
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}
