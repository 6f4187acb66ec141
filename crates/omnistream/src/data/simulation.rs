//! Metrics simulation engine for the pipeline dashboard.
//!
//! This module advances a [`PipelineState`] over time, making a dashboard
//! feel like it is watching a live pipeline. The simulation is designed to be:
//!
//! - **Deterministic**: Given the same seed and clock, produces identical results
//! - **Testable**: Driven by an injected `now` and an injected [`RandomSource`]
//! - **Configurable**: Rates and bounds come from [`SimConfig`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use chrono::{TimeDelta, Utc};
//! use omnistream::data::simulation::{SimConfig, Simulation};
//!
//! let start = Utc::now();
//! let mut sim = Simulation::new(42, start, SimConfig::default());
//!
//! // Advance once per render pass
//! sim.tick(start + TimeDelta::seconds(2));
//! ```
//!
//! # Draw order
//!
//! Each non-debounced tick draws, for every source in [`SourceKind::ALL`]
//! order: `int_inclusive` (batch rate), `chance` (failure), `index` (failure
//! kind, only on failure), `int_inclusive` (latency). Then `chance` (quality
//! check), and on a check `uniform` (quality shift) followed by `chance`
//! (schema violation vs. drift) only when the shift is a significant drop.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::generator;
use super::random::{RandomSource, SeededRandom};
use super::timeseries::{DEFAULT_CAPACITY, SeriesPoint, TimeSeriesBuffer};
use super::{
    Alert, AlertSeverity, Event, FailureKind, PipelineMetrics, SourceKind, SourceRecord,
    SourceStatus,
};
use crate::config::ConfigError;

/// Component name used for quality alerts.
pub const QUALITY_MONITOR: &str = "Data Quality Monitor";

/// Configuration for the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Minimum seconds between two state-changing ticks.
    pub debounce_secs: f64,
    /// Lower bound of the per-second batch rate draw.
    pub batch_rate_min: i64,
    /// Upper bound of the per-second batch rate draw.
    pub batch_rate_max: i64,
    /// Probability of a source failing on a tick.
    pub failure_rate: f64,
    /// Maximum latency move per tick.
    pub latency_step: u32,
    pub latency_min_ms: u32,
    pub latency_max_ms: u32,
    /// Batches larger than this produce an event.
    pub batch_event_threshold: u64,
    /// Probability of a quality score shift on a tick.
    pub quality_check_rate: f64,
    pub quality_shift_min: f64,
    pub quality_shift_max: f64,
    /// Shifts below this raise an alert.
    pub significant_drop: f64,
    /// Share of significant drops counted as schema violations (rest is drift).
    pub schema_violation_share: f64,
    pub quality_min: f64,
    pub quality_max: f64,
    /// Hourly rows kept in the time series.
    pub series_capacity: usize,
    /// Alerts and events kept.
    pub log_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            debounce_secs: 1.5,
            batch_rate_min: 10,
            batch_rate_max: 50,
            failure_rate: 0.05,
            latency_step: 20,
            latency_min_ms: 10,
            latency_max_ms: 500,
            batch_event_threshold: 30,
            quality_check_rate: 0.1,
            quality_shift_min: -0.5,
            quality_shift_max: 0.2,
            significant_drop: -0.3,
            schema_violation_share: 0.5,
            quality_min: 90.0,
            quality_max: 100.0,
            series_capacity: DEFAULT_CAPACITY,
            log_capacity: 20,
        }
    }
}

impl SimConfig {
    /// A noisy config for testing: failures and quality shifts are frequent.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            failure_rate: 0.3,
            quality_check_rate: 0.6,
            ..Self::default()
        }
    }

    /// A quiet config: failures and quality shifts are rare.
    #[must_use]
    pub fn calm() -> Self {
        Self {
            failure_rate: 0.005,
            quality_check_rate: 0.02,
            ..Self::default()
        }
    }

    /// Validate rates and bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if a probability is outside `[0, 1]`, a range is
    /// inverted, or a capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("failure_rate", self.failure_rate),
            ("quality_check_rate", self.quality_check_rate),
            ("schema_violation_share", self.schema_violation_share),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if !self.debounce_secs.is_finite() || self.debounce_secs < 0.0 {
            return Err(ConfigError::InvalidInterval(self.debounce_secs));
        }
        if self.batch_rate_min < 0 || self.batch_rate_min > self.batch_rate_max {
            return Err(ConfigError::InvalidRange("batch_rate"));
        }
        if self.latency_min_ms > self.latency_max_ms {
            return Err(ConfigError::InvalidRange("latency_ms"));
        }
        if !ordered(self.quality_min, self.quality_max) {
            return Err(ConfigError::InvalidRange("quality"));
        }
        if !ordered(self.quality_shift_min, self.quality_shift_max) {
            return Err(ConfigError::InvalidRange("quality_shift"));
        }
        if self.series_capacity == 0 {
            return Err(ConfigError::InvalidCapacity("series_capacity"));
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::InvalidCapacity("log_capacity"));
        }

        Ok(())
    }
}

/// `low <= high`, with NaN never ordered.
fn ordered(low: f64, high: f64) -> bool {
    matches!(
        low.partial_cmp(&high),
        Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
    )
}

/// What a non-debounced tick changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// The tick's timestamp.
    pub now: DateTime<Utc>,
    /// Records added across all sources.
    pub new_records: u64,
    /// Failures injected this tick.
    pub failures: Vec<(SourceKind, FailureKind)>,
    /// Quality shift applied, if a quality check fired.
    pub quality_shift: Option<f64>,
    /// Whether a new hourly row was appended.
    pub series_appended: bool,
}

/// Session state container.
///
/// Owned by the caller and advanced in place by [`PipelineState::tick`].
/// Renderers read it; only the simulator mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    /// The five sources, in [`SourceKind::ALL`] order.
    pub sources: Vec<SourceRecord>,
    /// Aggregates derived from the sources.
    pub metrics: PipelineMetrics,
    /// Hourly history.
    pub timeseries: TimeSeriesBuffer,
    /// Alerts, oldest first.
    pub alerts: Vec<Alert>,
    /// Events, oldest first.
    pub events: Vec<Event>,
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// When the state last advanced.
    pub last_update: DateTime<Utc>,
}

impl PipelineState {
    /// Seed a fresh session starting at `start`.
    #[must_use]
    pub fn generate<R: RandomSource>(start: DateTime<Utc>, rng: &mut R, config: &SimConfig) -> Self {
        generator::generate_state(start, rng, config)
    }

    /// Advance the state to `now`.
    ///
    /// Returns `None` without touching anything if less than
    /// `config.debounce_secs` has passed since the last update (including
    /// when `now` is earlier than the last update).
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn tick<R: RandomSource>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
        config: &SimConfig,
    ) -> Option<TickReport> {
        let since_last = seconds_between(self.last_update, now);
        if since_last < config.debounce_secs {
            tracing::trace!(since_last, "Tick debounced");
            return None;
        }

        let mut failures = Vec::new();

        for source in &mut self.sources {
            let elapsed = seconds_between(source.last_update, now).max(0.0);
            let rate = rng.int_inclusive(config.batch_rate_min, config.batch_rate_max);
            let records = (elapsed * rate.max(0) as f64).floor() as u64;

            if rng.chance(config.failure_rate) {
                let pick = rng.index(FailureKind::ALL.len()) % FailureKind::ALL.len();
                let kind = FailureKind::ALL[pick];
                source.failures += 1;
                failures.push((source.kind, kind));
                tracing::info!(
                    source = source.kind.id(),
                    failure = kind.name(),
                    "Injected source failure"
                );
                self.alerts.push(Alert::new(
                    now,
                    source.name.clone(),
                    format!(
                        "{} encountered when processing {}",
                        kind.name(),
                        source.kind.id()
                    ),
                    kind.severity(),
                ));
            }

            source.records_processed += records;
            source.latency_ms = step_latency(source.latency_ms, rng, config);

            if records > config.batch_event_threshold {
                self.events.push(Event::info(
                    now,
                    source.name.clone(),
                    format!("Processed large batch: {records} records"),
                ));
            }

            source.last_update = now;
        }

        let previous_total = self.metrics.total_records_processed;
        self.refresh_aggregates();
        let new_records = self
            .metrics
            .total_records_processed
            .saturating_sub(previous_total);

        let quality_shift = self.shift_quality(now, rng, config);

        let series_appended = self.timeseries.push_if_new_bucket(SeriesPoint {
            bucket: now,
            throughput: new_records,
            latency_ms: self.metrics.overall_latency_ms,
            error_rate: self.metrics.error_rate(),
            quality_score: self.metrics.data_quality_score,
        });

        trim_front(&mut self.alerts, config.log_capacity);
        trim_front(&mut self.events, config.log_capacity);

        self.last_update = now;

        tracing::debug!(
            new_records,
            total_records = self.metrics.total_records_processed,
            failures = failures.len(),
            series_appended,
            "Tick applied"
        );

        Some(TickReport {
            now,
            new_records,
            failures,
            quality_shift,
            series_appended,
        })
    }

    /// Recompute the aggregate metrics from the sources.
    #[allow(clippy::cast_precision_loss)]
    pub fn refresh_aggregates(&mut self) {
        self.metrics.total_records_processed =
            self.sources.iter().map(|s| s.records_processed).sum();
        self.metrics.total_errors = self.sources.iter().map(|s| s.failures).sum();
        self.metrics.overall_latency_ms = if self.sources.is_empty() {
            0.0
        } else {
            self.sources
                .iter()
                .map(|s| f64::from(s.latency_ms))
                .sum::<f64>()
                / self.sources.len() as f64
        };
        self.metrics.active_sources = self
            .sources
            .iter()
            .filter(|s| s.status == SourceStatus::Active)
            .count();
    }

    /// Maybe random-walk the quality score, returning the applied shift.
    fn shift_quality<R: RandomSource>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
        config: &SimConfig,
    ) -> Option<f64> {
        if !rng.chance(config.quality_check_rate) {
            return None;
        }

        let delta = rng.uniform(config.quality_shift_min, config.quality_shift_max);
        self.metrics.data_quality_score = (self.metrics.data_quality_score + delta)
            .clamp(config.quality_min, config.quality_max);

        if delta < config.significant_drop {
            let score = self.metrics.data_quality_score;
            tracing::info!(delta, score, "Data quality dropped");
            self.alerts.push(Alert::new(
                now,
                QUALITY_MONITOR,
                format!("Data quality score decreased to {score:.2}%"),
                AlertSeverity::Medium,
            ));

            if rng.chance(config.schema_violation_share) {
                self.metrics.schema_violations += 1;
            } else {
                self.metrics.data_drift_incidents += 1;
            }
        }

        Some(delta)
    }

    /// Look up a source by kind.
    #[must_use]
    pub fn source(&self, kind: SourceKind) -> Option<&SourceRecord> {
        self.sources.iter().find(|s| s.kind == kind)
    }

    /// The `n` most recent alerts, newest first.
    pub fn recent_alerts(&self, n: usize) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().rev().take(n)
    }

    /// The `n` most recent events, newest first.
    pub fn recent_events(&self, n: usize) -> impl Iterator<Item = &Event> {
        self.events.iter().rev().take(n)
    }
}

/// Move a latency by at most `latency_step`, staying within bounds.
fn step_latency<R: RandomSource>(current: u32, rng: &mut R, config: &SimConfig) -> u32 {
    let min = i64::from(config.latency_min_ms);
    let max = i64::from(config.latency_max_ms);
    let current = i64::from(current);
    let step = i64::from(config.latency_step);

    let low = (current - step).max(min);
    let high = (current + step).min(max);
    let next = rng.int_inclusive(low, high).clamp(low.min(high), high.max(low));

    u32::try_from(next.clamp(min, max)).unwrap_or(config.latency_min_ms)
}

/// Signed seconds from `from` to `to`.
#[allow(clippy::cast_precision_loss)]
fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    delta
        .num_microseconds()
        .map_or_else(|| delta.num_milliseconds() as f64 / 1_000.0, |us| us as f64 / 1_000_000.0)
}

/// Keep only the last `max` items.
fn trim_front<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}

/// The simulation engine.
///
/// Bundles a [`PipelineState`] with the random source and config that drive
/// it.
#[derive(Debug, Clone)]
pub struct Simulation<R: RandomSource = SeededRandom> {
    /// Random source (seeded for determinism).
    rng: R,
    /// Simulation configuration.
    config: SimConfig,
    /// Session state.
    state: PipelineState,
    /// Number of ticks that were not debounced.
    applied: u64,
}

impl Simulation<SeededRandom> {
    /// Create a new simulation with the given seed, session start and config.
    ///
    /// `config` must pass [`SimConfig::validate`]; see [`Simulation::from_state`].
    #[must_use]
    pub fn new(seed: u64, start: DateTime<Utc>, config: SimConfig) -> Self {
        Self::with_random(SeededRandom::new(seed), start, config)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Create a simulation seeded from the given random source.
    ///
    /// `config` must pass [`SimConfig::validate`]; see [`Simulation::from_state`].
    #[must_use]
    pub fn with_random(mut rng: R, start: DateTime<Utc>, config: SimConfig) -> Self {
        let state = PipelineState::generate(start, &mut rng, &config);
        Self::from_state(state, rng, config)
    }

    /// Wrap an existing state.
    ///
    /// `config` must pass [`SimConfig::validate`]: an inverted or NaN
    /// quality range makes `tick` panic when it clamps the score. Debug
    /// builds check this here.
    #[must_use]
    pub fn from_state(state: PipelineState, rng: R, config: SimConfig) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "simulation built from an invalid SimConfig: {config:?}"
        );
        Self {
            rng,
            config,
            state,
            applied: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Mutable state, for seeding scenarios.
    pub const fn state_mut(&mut self) -> &mut PipelineState {
        &mut self.state
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub const fn applied_ticks(&self) -> u64 {
        self.applied
    }

    /// Consume the simulation, returning its state.
    #[must_use]
    pub fn into_state(self) -> PipelineState {
        self.state
    }

    /// Advance the simulation to `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TickReport> {
        let report = self.state.tick(now, &mut self.rng, &self.config);
        if report.is_some() {
            self.applied += 1;
        }
        report
    }

    /// Advance the clock by `step` before each of `n` ticks, starting from
    /// `from`.
    ///
    /// Returns how many ticks were applied (not debounced). Stops early if
    /// the clock would leave chrono's supported date range.
    pub fn tick_n(&mut self, from: DateTime<Utc>, step: TimeDelta, n: u64) -> u64 {
        let mut now = from;
        let mut applied = 0;
        for _ in 0..n {
            let Some(next) = now.checked_add_signed(step) else {
                tracing::warn!(%now, "Simulated clock overflow, stopping");
                break;
            };
            now = next;
            if self.tick(now).is_some() {
                applied += 1;
            }
        }
        applied
    }
}
