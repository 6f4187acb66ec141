//! Deterministic session seeding.
//!
//! Builds the state a session starts from: the five sources with seeded
//! latencies and staggered update times, default aggregates, and two days of
//! historical hourly rows. Two runs with the same random source produce
//! identical states.

use chrono::{DateTime, TimeDelta, Utc};

use super::random::RandomSource;
use super::simulation::{PipelineState, SimConfig};
use super::timeseries::{SeriesPoint, TimeSeriesBuffer, hour_bucket};
use super::{PipelineMetrics, SourceKind, SourceRecord};

// ============================================================================
// Static Data Pools
// ============================================================================

/// Initial latency range (ms) and minutes since last update, per source.
const SOURCE_SEEDS: [(SourceKind, (i64, i64), i64); 5] = [
    (SourceKind::StockMarket, (50, 150), 2),
    (SourceKind::Weather, (100, 250), 3),
    (SourceKind::SocialMedia, (150, 300), 1),
    (SourceKind::Retail, (75, 200), 4),
    (SourceKind::IotSensors, (20, 80), 2),
];

/// Historical throughput range (records per hour).
const HISTORY_THROUGHPUT: (i64, i64) = (5_000, 15_000);
/// Historical latency range (ms).
const HISTORY_LATENCY: (i64, i64) = (50, 500);
/// Historical error rate range (%).
const HISTORY_ERROR_RATE: (f64, f64) = (0.0, 2.0);
/// Historical quality score range.
const HISTORY_QUALITY: (f64, f64) = (95.0, 100.0);

// ============================================================================
// Generator
// ============================================================================

/// Seed a session starting at `start`.
#[must_use]
pub fn generate_state<R: RandomSource>(
    start: DateTime<Utc>,
    rng: &mut R,
    config: &SimConfig,
) -> PipelineState {
    let sources = generate_sources(start, rng, config);
    let timeseries = generate_history(start, rng, config.series_capacity);

    let mut state = PipelineState {
        sources,
        metrics: PipelineMetrics::default(),
        timeseries,
        alerts: Vec::new(),
        events: Vec::new(),
        start_time: start,
        last_update: start,
    };
    state.refresh_aggregates();
    state
}

fn generate_sources<R: RandomSource>(
    start: DateTime<Utc>,
    rng: &mut R,
    config: &SimConfig,
) -> Vec<SourceRecord> {
    SOURCE_SEEDS
        .iter()
        .map(|&(kind, (low, high), minutes_ago)| {
            let latency = rng
                .int_inclusive(low, high)
                .clamp(i64::from(config.latency_min_ms), i64::from(config.latency_max_ms));
            SourceRecord::new(
                kind,
                u32::try_from(latency).unwrap_or(config.latency_min_ms),
                start - TimeDelta::minutes(minutes_ago),
            )
        })
        .collect()
}

/// One row per hour for the `capacity` hours before `start`'s hour.
#[allow(clippy::cast_precision_loss)]
fn generate_history<R: RandomSource>(
    start: DateTime<Utc>,
    rng: &mut R,
    capacity: usize,
) -> TimeSeriesBuffer {
    let current = hour_bucket(start);
    let hours = i64::try_from(capacity).unwrap_or(i64::MAX);

    let points: Vec<_> = (1..=hours)
        .rev()
        .map(|h| SeriesPoint {
            bucket: current - TimeDelta::hours(h),
            throughput: rng
                .int_inclusive(HISTORY_THROUGHPUT.0, HISTORY_THROUGHPUT.1)
                .unsigned_abs(),
            latency_ms: rng.int_inclusive(HISTORY_LATENCY.0, HISTORY_LATENCY.1) as f64,
            error_rate: rng.uniform(HISTORY_ERROR_RATE.0, HISTORY_ERROR_RATE.1),
            quality_score: rng.uniform(HISTORY_QUALITY.0, HISTORY_QUALITY.1),
        })
        .collect();

    TimeSeriesBuffer::from_points(points, capacity)
}
