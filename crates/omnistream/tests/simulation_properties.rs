#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]

use chrono::{DateTime, TimeDelta, Utc};
use omnistream::data::simulation::{SimConfig, Simulation};
use omnistream::data::timeseries::hour_bucket;
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn any_config() -> impl Strategy<Value = SimConfig> {
    prop_oneof![
        Just(SimConfig::default()),
        Just(SimConfig::fast()),
        Just(SimConfig::calm()),
    ]
}

// =============================================================================
// Aggregate invariants
// =============================================================================

proptest! {
    #[test]
    fn totals_match_sources(
        seed in any::<u64>(),
        config in any_config(),
        steps in prop::collection::vec(0i64..20_000, 1..60),
    ) {
        let mut sim = Simulation::new(seed, start(), config);
        let mut now = start();

        for step in steps {
            now += TimeDelta::milliseconds(step);
            sim.tick(now);

            let state = sim.state();
            let records: u64 = state.sources.iter().map(|s| s.records_processed).sum();
            let errors: u64 = state.sources.iter().map(|s| s.failures).sum();
            prop_assert_eq!(state.metrics.total_records_processed, records);
            prop_assert_eq!(state.metrics.total_errors, errors);
        }
    }

    #[test]
    fn bounds_hold_after_every_tick(
        seed in any::<u64>(),
        config in any_config(),
        steps in prop::collection::vec(0i64..7_200_000, 1..60),
    ) {
        let mut sim = Simulation::new(seed, start(), config.clone());
        let mut now = start();

        for step in steps {
            let before: Vec<_> = sim.state().sources.iter().map(|s| s.latency_ms).collect();
            now += TimeDelta::milliseconds(step);
            let applied = sim.tick(now).is_some();
            let state = sim.state();

            for (source, prev) in state.sources.iter().zip(&before) {
                prop_assert!(
                    (config.latency_min_ms..=config.latency_max_ms).contains(&source.latency_ms),
                    "latency {} out of bounds", source.latency_ms
                );
                if applied {
                    prop_assert!(source.latency_ms.abs_diff(*prev) <= config.latency_step);
                } else {
                    prop_assert_eq!(source.latency_ms, *prev);
                }
            }

            let quality = state.metrics.data_quality_score;
            prop_assert!((config.quality_min..=config.quality_max).contains(&quality));
            prop_assert!(state.timeseries.len() <= config.series_capacity);
            prop_assert!(state.alerts.len() <= config.log_capacity);
            prop_assert!(state.events.len() <= config.log_capacity);
        }
    }
}

// =============================================================================
// Debounce and ordering
// =============================================================================

proptest! {
    #[test]
    fn ticks_inside_window_are_idempotent(
        seed in any::<u64>(),
        first in 1_500i64..600_000,
        second in 0i64..1_500,
    ) {
        let mut sim = Simulation::new(seed, start(), SimConfig::fast());
        let at = start() + TimeDelta::milliseconds(first);
        prop_assert!(sim.tick(at).is_some());

        let snapshot = sim.state().clone();
        prop_assert!(sim.tick(at + TimeDelta::milliseconds(second)).is_none());
        prop_assert_eq!(sim.state(), &snapshot);
    }

    #[test]
    fn counters_are_monotonic(
        seed in any::<u64>(),
        steps in prop::collection::vec(0i64..120_000, 1..80),
    ) {
        let mut sim = Simulation::new(seed, start(), SimConfig::fast());
        let mut now = start();
        let mut prev = sim.state().metrics.clone();

        for step in steps {
            now += TimeDelta::milliseconds(step);
            sim.tick(now);
            let metrics = &sim.state().metrics;
            prop_assert!(metrics.total_records_processed >= prev.total_records_processed);
            prop_assert!(metrics.total_errors >= prev.total_errors);
            prop_assert!(metrics.schema_violations >= prev.schema_violations);
            prop_assert!(metrics.data_drift_incidents >= prev.data_drift_incidents);
            prev = metrics.clone();
        }
    }

    #[test]
    fn series_stays_hour_aligned_and_ordered(
        seed in any::<u64>(),
        hours in prop::collection::vec(0i64..5, 1..30),
    ) {
        let mut sim = Simulation::new(seed, start(), SimConfig::default());
        let mut now = start();

        for h in hours {
            now += TimeDelta::hours(h) + TimeDelta::seconds(2);
            sim.tick(now);
        }

        let buckets: Vec<_> = sim.state().timeseries.timestamps().collect();
        prop_assert_eq!(buckets.len(), 48);
        for bucket in &buckets {
            prop_assert_eq!(hour_bucket(*bucket), *bucket);
        }
        for pair in buckets.windows(2) {
            prop_assert!(pair[0] < pair[1], "buckets out of order: {:?}", pair);
        }
        prop_assert_eq!(sim.state().timeseries.latest_bucket(), Some(hour_bucket(now)));
    }

    #[test]
    fn same_seed_same_run(
        seed in any::<u64>(),
        steps in prop::collection::vec(0i64..30_000, 1..40),
    ) {
        let run = || {
            let mut sim = Simulation::new(seed, start(), SimConfig::fast());
            let mut now = start();
            for step in &steps {
                now += TimeDelta::milliseconds(*step);
                sim.tick(now);
            }
            sim.into_state()
        };
        prop_assert_eq!(run(), run());
    }
}
