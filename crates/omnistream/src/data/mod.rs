//! Domain model types and simulation for the pipeline dashboard.
//!
//! These types represent the state a dashboard reads and the simulator
//! mutates. They are designed to be:
//! - Small and presentation-friendly
//! - Cheaply cloneable
//! - Serializable for snapshots/debugging
//!
//! The [`simulation`] module advances a [`PipelineState`] on each tick, and
//! the [`generator`] module seeds the initial session state.

pub mod generator;
pub mod random;
pub mod simulation;
pub mod timeseries;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use simulation::{PipelineState, Simulation, TickReport};
pub use timeseries::{SeriesPoint, TimeSeriesBuffer};

// ============================================================================
// Source Domain
// ============================================================================

/// One of the fixed set of upstream feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StockMarket,
    Weather,
    SocialMedia,
    Retail,
    IotSensors,
}

impl SourceKind {
    /// All sources, in tick order.
    pub const ALL: [Self; 5] = [
        Self::StockMarket,
        Self::Weather,
        Self::SocialMedia,
        Self::Retail,
        Self::IotSensors,
    ];

    /// Stable identifier used in alert messages.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::StockMarket => "stock_market",
            Self::Weather => "weather_data",
            Self::SocialMedia => "social_media",
            Self::Retail => "retail_transactions",
            Self::IotSensors => "iot_sensors",
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StockMarket => "Stock Market API",
            Self::Weather => "Weather API",
            Self::SocialMedia => "Social Media Analytics",
            Self::Retail => "Retail Transactions",
            Self::IotSensors => "IoT Sensor Network",
        }
    }
}

/// Whether a source is currently feeding the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    #[default]
    Active,
    Inactive,
}

impl SourceStatus {
    /// Get display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Per-source counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Which feed this record tracks.
    pub kind: SourceKind,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: SourceStatus,
    /// Records processed so far. Never decreases.
    pub records_processed: u64,
    /// Failures seen so far. Never decreases.
    pub failures: u64,
    /// When this source was last advanced.
    pub last_update: DateTime<Utc>,
    /// Current latency, kept within the configured bounds.
    pub latency_ms: u32,
}

impl SourceRecord {
    /// Create a fresh, active source with zeroed counters.
    #[must_use]
    pub fn new(kind: SourceKind, latency_ms: u32, last_update: DateTime<Utc>) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            status: SourceStatus::Active,
            records_processed: 0,
            failures: 0,
            last_update,
            latency_ms,
        }
    }

    /// Failure percentage over this source's records.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "Counters stay far below 2^52"
    )]
    pub fn error_rate(&self) -> f64 {
        100.0 * self.failures as f64 / self.records_processed.max(1) as f64
    }
}

/// Kind of injected source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    ApiTimeout,
    ConnectionError,
    AuthenticationFailure,
    RateLimitExceeded,
    MalformedResponse,
}

impl FailureKind {
    /// All failure kinds, in draw order.
    pub const ALL: [Self; 5] = [
        Self::ApiTimeout,
        Self::ConnectionError,
        Self::AuthenticationFailure,
        Self::RateLimitExceeded,
        Self::MalformedResponse,
    ];

    /// Get display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApiTimeout => "API Timeout",
            Self::ConnectionError => "Connection Error",
            Self::AuthenticationFailure => "Authentication Failure",
            Self::RateLimitExceeded => "Rate Limit Exceeded",
            Self::MalformedResponse => "Malformed Response",
        }
    }

    /// Severity of the alert raised for this failure.
    #[must_use]
    pub const fn severity(self) -> AlertSeverity {
        match self {
            Self::AuthenticationFailure | Self::ConnectionError => AlertSeverity::High,
            _ => AlertSeverity::Medium,
        }
    }
}

// ============================================================================
// Aggregate Metrics
// ============================================================================

/// Pipeline-wide aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// Sum of `records_processed` over all sources.
    pub total_records_processed: u64,
    /// Sum of `failures` over all sources.
    pub total_errors: u64,
    /// Mean latency across sources.
    pub overall_latency_ms: f64,
    /// Quality score (90.0-100.0).
    pub data_quality_score: f64,
    /// Uptime percentage.
    pub pipeline_uptime: f64,
    /// Number of sources with [`SourceStatus::Active`].
    pub active_sources: usize,
    /// Number of sinks fed by the pipeline.
    pub active_destinations: usize,
    pub schema_violations: u64,
    pub data_drift_incidents: u64,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            total_records_processed: 0,
            total_errors: 0,
            overall_latency_ms: 0.0,
            data_quality_score: 98.5,
            pipeline_uptime: 99.98,
            active_sources: SourceKind::ALL.len(),
            active_destinations: 3,
            schema_violations: 0,
            data_drift_incidents: 0,
        }
    }
}

impl PipelineMetrics {
    /// Error percentage over everything processed so far.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "Counters stay far below 2^52"
    )]
    pub fn error_rate(&self) -> f64 {
        100.0 * self.total_errors as f64 / self.total_records_processed.max(1) as f64
    }
}

// ============================================================================
// Alert / Event Domain
// ============================================================================

/// Severity level of an alert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Needs attention.
    #[default]
    Medium,
    /// Needs immediate attention.
    High,
}

impl AlertSeverity {
    /// Get display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Get severity icon.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Medium => "⚠",
            Self::High => "‼",
        }
    }
}

/// An alert raised by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
    /// Source name or monitoring component.
    pub source: String,
    /// Alert message.
    pub message: String,
    /// Severity level.
    pub severity: AlertSeverity,
}

impl Alert {
    /// Create a new alert.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
        message: impl Into<String>,
        severity: AlertSeverity,
    ) -> Self {
        Self {
            timestamp,
            source: source.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Kind of pipeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Info,
}

impl EventKind {
    /// Get display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
        }
    }
}

/// An informational pipeline event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Component that emitted the event.
    pub component: String,
    /// Event message.
    pub message: String,
    /// Event kind.
    pub kind: EventKind,
}

impl Event {
    /// Create a new info event.
    #[must_use]
    pub fn info(
        timestamp: DateTime<Utc>,
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            component: component.into(),
            message: message.into(),
            kind: EventKind::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_severity_mapping() {
        assert_eq!(FailureKind::AuthenticationFailure.severity(), AlertSeverity::High);
        assert_eq!(FailureKind::ConnectionError.severity(), AlertSeverity::High);
        assert_eq!(FailureKind::ApiTimeout.severity(), AlertSeverity::Medium);
        assert_eq!(FailureKind::RateLimitExceeded.severity(), AlertSeverity::Medium);
        assert_eq!(FailureKind::MalformedResponse.severity(), AlertSeverity::Medium);
    }

    #[test]
    fn source_ids_are_unique() {
        let mut ids: Vec<_> = SourceKind::ALL.iter().map(|k| k.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SourceKind::ALL.len());
    }

    #[test]
    fn new_source_starts_active_and_zeroed() {
        let source = SourceRecord::new(SourceKind::Weather, 120, Utc::now());
        assert_eq!(source.name, "Weather API");
        assert_eq!(source.status, SourceStatus::Active);
        assert_eq!(source.records_processed, 0);
        assert_eq!(source.failures, 0);
    }

    #[test]
    fn source_error_rate_guards_zero_records() {
        let mut source = SourceRecord::new(SourceKind::IotSensors, 40, Utc::now());
        source.failures = 2;
        assert!((source.error_rate() - 200.0).abs() < 1e-9);

        source.records_processed = 400;
        assert!((source.error_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn error_rate_guards_zero_records() {
        let mut metrics = PipelineMetrics::default();
        assert!(metrics.error_rate().abs() < f64::EPSILON);

        metrics.total_errors = 5;
        assert!((metrics.error_rate() - 500.0).abs() < 1e-9);

        metrics.total_records_processed = 1000;
        assert!((metrics.error_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn alert_severity_ordering() {
        assert!(AlertSeverity::Medium < AlertSeverity::High);
    }
}
