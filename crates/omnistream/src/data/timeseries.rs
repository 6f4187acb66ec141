//! Hour-bucketed metric history.
//!
//! The dashboard charts four series (throughput, latency, error rate and
//! quality score) over the same timestamps. They are stored as one sequence
//! of [`SeriesPoint`] rows so the four views can never disagree in length,
//! and the sequence is capped with oldest-first eviction.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of hourly rows kept (two days).
pub const DEFAULT_CAPACITY: usize = 48;

const SECONDS_PER_HOUR: i64 = 3600;

/// Truncate a timestamp to the start of its hour.
#[must_use]
pub fn hour_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = ts.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(SECONDS_PER_HOUR), 0).unwrap_or(ts)
}

/// One synchronized row across all four series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Hour bucket this row belongs to.
    pub bucket: DateTime<Utc>,
    /// Records processed since the previous row.
    pub throughput: u64,
    /// Mean source latency in milliseconds.
    pub latency_ms: f64,
    /// Error percentage (0.0-100.0).
    pub error_rate: f64,
    /// Quality score (90.0-100.0).
    pub quality_score: f64,
}

/// Bounded FIFO of [`SeriesPoint`] rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesBuffer {
    points: VecDeque<SeriesPoint>,
    capacity: usize,
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TimeSeriesBuffer {
    /// Create an empty buffer holding at most `capacity` rows.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Import existing rows as-is.
    ///
    /// Rows beyond `capacity` are kept until the next append, which trims
    /// the buffer back down.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = SeriesPoint>, capacity: usize) -> Self {
        Self {
            points: points.into_iter().collect(),
            capacity,
        }
    }

    /// Maximum number of rows retained after an append.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bucket of the most recent row.
    #[must_use]
    pub fn latest_bucket(&self) -> Option<DateTime<Utc>> {
        self.points.back().map(|p| p.bucket)
    }

    /// Append a row, evicting the oldest rows beyond capacity.
    ///
    /// Returns the number of rows evicted.
    pub fn push(&mut self, point: SeriesPoint) -> usize {
        self.points.push_back(point);
        let mut evicted = 0;
        while self.points.len() > self.capacity {
            self.points.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Append `point` only if its hour bucket differs from the latest row.
    ///
    /// `point.bucket` is truncated to the hour before comparing, so rows
    /// always carry hour-aligned keys.
    pub fn push_if_new_bucket(&mut self, mut point: SeriesPoint) -> bool {
        point.bucket = hour_bucket(point.bucket);
        if self.latest_bucket() == Some(point.bucket) {
            return false;
        }
        self.push(point);
        true
    }

    /// Iterate rows, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SeriesPoint> + ExactSizeIterator {
        self.points.iter()
    }

    /// Row timestamps, oldest first.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.points.iter().map(|p| p.bucket)
    }

    /// Throughput series, oldest first.
    pub fn throughput(&self) -> impl Iterator<Item = u64> + '_ {
        self.points.iter().map(|p| p.throughput)
    }

    /// Latency series, oldest first.
    pub fn latency(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.latency_ms)
    }

    /// Error rate series, oldest first.
    pub fn error_rate(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.error_rate)
    }

    /// Quality score series, oldest first.
    pub fn quality_score(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.quality_score)
    }

    /// Mean throughput over the last `n` rows (0.0 when empty).
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "Throughput values stay far below 2^52"
    )]
    pub fn recent_mean_throughput(&self, n: usize) -> f64 {
        mean(self.points.iter().rev().take(n).map(|p| p.throughput as f64))
    }

    /// Mean latency over the last `n` rows (0.0 when empty).
    #[must_use]
    pub fn recent_mean_latency(&self, n: usize) -> f64 {
        mean(self.points.iter().rev().take(n).map(|p| p.latency_ms))
    }
}

#[expect(clippy::cast_precision_loss, reason = "Window sizes are tiny")]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
