//! Headless session runner.
//!
//! Drives a [`Simulation`] against a simulated clock for the configured
//! number of ticks and hands back the final state. No wall-clock waiting is
//! involved, so long sessions finish immediately.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::data::Simulation;
use crate::export::Snapshot;

/// Outcome of a headless run.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Seed the session ran with.
    pub seed: u64,
    /// Session start.
    pub start: DateTime<Utc>,
    /// Ticks requested.
    pub requested: u32,
    /// Ticks that were applied (not debounced).
    pub applied: u64,
    /// Final dashboard snapshot.
    pub snapshot: Snapshot,
}

/// Run a session described by `config`.
#[must_use]
pub fn run_session(config: &Config) -> SessionOutcome {
    let seed = config.effective_seed();
    let start = config.effective_start();

    tracing::info!(
        seed,
        start = %start.to_rfc3339(),
        ticks = config.ticks,
        interval_secs = config.interval_secs,
        "Starting simulated session"
    );

    let mut sim = Simulation::new(seed, start, config.sim.clone());
    let applied = sim.tick_n(start, config.interval(), u64::from(config.ticks));

    if applied < u64::from(config.ticks) {
        tracing::warn!(
            requested = config.ticks,
            applied,
            debounce_secs = config.sim.debounce_secs,
            "Some ticks fell inside the debounce window"
        );
    }

    let snapshot = sim.state().snapshot();
    tracing::info!(
        applied,
        total_records = snapshot.metrics.total_records_processed,
        total_errors = snapshot.metrics.total_errors,
        alerts = snapshot.alerts.len(),
        "Session finished"
    );

    SessionOutcome {
        seed,
        start,
        requested: config.ticks,
        applied,
        snapshot,
    }
}
