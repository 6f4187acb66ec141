#![forbid(unsafe_code)]

//! # OmniStream
//!
//! Deterministic metrics simulator for a multi-source data pipeline
//! dashboard.
//!
//! The simulator keeps per-source counters for five upstream feeds,
//! pipeline-wide aggregates, a two-day hourly history, and bounded alert and
//! event logs. Time and randomness are injected, so a seed plus a start
//! timestamp reproduce a session exactly.
//!
//! ## Public Modules
//!
//! - [`data`] - Domain model, session seeding and the simulation engine
//! - [`export`] - Read-only snapshots and their text/JSON renderings
//! - [`session`] - Headless runner over a simulated clock
//! - [`config`] - Runtime configuration
//! - [`cli`] - Command-line contract
//! - [`test_support`] - Scripted random source for exact scenarios

pub mod cli;
pub mod config;
pub mod data;
pub mod export;
pub mod session;
pub mod test_support;
