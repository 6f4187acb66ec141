//! Read-only snapshots of a session for renderers.
//!
//! A [`Snapshot`] is what a dashboard consumes: the headline numbers, the
//! five sources, the hourly history, and the most recent alerts and events
//! (newest first). It can be rendered as plain text or JSON.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::data::{Alert, Event, PipelineMetrics, PipelineState, SeriesPoint, SourceRecord};

/// Number of alerts/events a dashboard shows, and the window for recent
/// averages.
pub const RECENT_WINDOW: usize = 5;

/// Owned view of a [`PipelineState`] at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// When the state last advanced.
    pub taken_at: DateTime<Utc>,
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// Aggregate metrics.
    pub metrics: PipelineMetrics,
    /// Error percentage over everything processed.
    pub error_rate: f64,
    /// Mean throughput over the last [`RECENT_WINDOW`] hourly rows.
    pub recent_throughput: f64,
    /// Mean latency over the last [`RECENT_WINDOW`] hourly rows.
    pub recent_latency_ms: f64,
    /// Per-source counters and error rates.
    pub sources: Vec<SourceSummary>,
    /// Hourly history, oldest first.
    pub series: Vec<SeriesPoint>,
    /// Most recent alerts, newest first.
    pub alerts: Vec<Alert>,
    /// Most recent events, newest first.
    pub events: Vec<Event>,
}

/// One source row of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    #[serde(flatten)]
    pub record: SourceRecord,
    /// Failure percentage over this source's records.
    pub error_rate: f64,
}

impl From<&SourceRecord> for SourceSummary {
    fn from(record: &SourceRecord) -> Self {
        Self {
            record: record.clone(),
            error_rate: record.error_rate(),
        }
    }
}

impl Snapshot {
    /// Capture the current state.
    #[must_use]
    pub fn capture(state: &PipelineState) -> Self {
        Self {
            taken_at: state.last_update,
            start_time: state.start_time,
            metrics: state.metrics.clone(),
            error_rate: state.metrics.error_rate(),
            recent_throughput: state.timeseries.recent_mean_throughput(RECENT_WINDOW),
            recent_latency_ms: state.timeseries.recent_mean_latency(RECENT_WINDOW),
            sources: state.sources.iter().map(SourceSummary::from).collect(),
            series: state.timeseries.iter().cloned().collect(),
            alerts: state.recent_alerts(RECENT_WINDOW).cloned().collect(),
            events: state.recent_events(RECENT_WINDOW).cloned().collect(),
        }
    }
}

impl PipelineState {
    /// Capture a read-only [`Snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

/// Render a snapshot in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(snapshot: &Snapshot, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(snapshot)),
        OutputFormat::Json => render_json(snapshot),
    }
}

/// Render a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// Render a snapshot as a plain-text summary.
#[must_use]
pub fn render_text(snapshot: &Snapshot) -> String {
    let m = &snapshot.metrics;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "OmniStream pipeline @ {}",
        snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "  Active sources     {}/{}",
        m.active_sources,
        snapshot.sources.len()
    );
    let _ = writeln!(
        out,
        "  Records processed  {}",
        group_thousands(m.total_records_processed)
    );
    let _ = writeln!(out, "  Avg latency        {:.0}ms", m.overall_latency_ms);
    let _ = writeln!(out, "  Quality score      {:.1}%", m.data_quality_score);
    let _ = writeln!(
        out,
        "  Errors             {} ({:.2}%)",
        group_thousands(m.total_errors),
        snapshot.error_rate
    );
    let _ = writeln!(out, "  Schema violations  {}", m.schema_violations);
    let _ = writeln!(out, "  Data drift         {}", m.data_drift_incidents);
    let _ = writeln!(out, "  Uptime             {:.2}%", m.pipeline_uptime);

    out.push_str("\nSources\n");
    for SourceSummary { record, error_rate } in &snapshot.sources {
        let _ = writeln!(
            out,
            "  {:<24} {:<8} {:>12} records {:>4} failures ({:>5.2}%) {:>4}ms",
            record.name,
            record.status.name(),
            group_thousands(record.records_processed),
            record.failures,
            error_rate,
            record.latency_ms
        );
    }

    out.push_str("\nRecent alerts\n");
    if snapshot.alerts.is_empty() {
        out.push_str("  No alerts to display.\n");
    }
    for alert in &snapshot.alerts {
        let _ = writeln!(
            out,
            "  {} [{}] {} {}: {}",
            alert.severity.icon(),
            alert.severity.name(),
            alert.timestamp.format("%H:%M:%S"),
            alert.source,
            alert.message
        );
    }

    out.push_str("\nRecent events\n");
    if snapshot.events.is_empty() {
        out.push_str("  No events to display.\n");
    }
    for event in &snapshot.events {
        let _ = writeln!(
            out,
            "  [{}] {} {}: {}",
            event.kind.name(),
            event.timestamp.format("%H:%M:%S"),
            event.component,
            event.message
        );
    }

    let _ = writeln!(
        out,
        "\nHistory: {} hourly points, recent throughput {:.0}, recent latency {:.0}ms",
        snapshot.series.len(),
        snapshot.recent_throughput,
        snapshot.recent_latency_ms
    );

    out
}

/// Format an integer with comma thousands separators.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::data::random::SeededRandom;
    use crate::data::simulation::{SimConfig, Simulation};
    use crate::data::AlertSeverity;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn busy_simulation() -> Simulation<SeededRandom> {
        let config = SimConfig {
            failure_rate: 1.0,
            quality_check_rate: 0.0,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(42, start(), config);
        sim.tick_n(start(), TimeDelta::seconds(2), 3);
        sim
    }

    #[test]
    fn group_thousands_inserts_commas() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn snapshot_caps_recent_lists() {
        let sim = busy_simulation();
        let snapshot = sim.state().snapshot();

        assert_eq!(sim.state().alerts.len(), 15);
        assert_eq!(snapshot.alerts.len(), RECENT_WINDOW);
        assert_eq!(snapshot.sources.len(), 5);
        assert_eq!(snapshot.series.len(), sim.state().timeseries.len());
        assert_eq!(snapshot.taken_at, sim.state().last_update);
    }

    #[test]
    fn snapshot_alerts_are_newest_first() {
        let mut state = busy_simulation().into_state();
        state.alerts.push(Alert::new(
            start() + TimeDelta::hours(1),
            "Test",
            "latest",
            AlertSeverity::High,
        ));
        state.events.push(Event::info(start() + TimeDelta::hours(1), "Test", "latest"));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.alerts[0].message, "latest");
        assert_eq!(snapshot.events[0].message, "latest");
    }

    #[test]
    fn text_render_contains_headline_numbers() {
        let snapshot = busy_simulation().state().snapshot();
        let text = render_text(&snapshot);

        assert!(text.starts_with("OmniStream pipeline @ 2023-11-14 22:13:26 UTC"));
        assert!(text.contains("Active sources     5/5"));
        assert!(text.contains(&format!(
            "Records processed  {}",
            group_thousands(snapshot.metrics.total_records_processed)
        )));
        assert!(text.contains("Stock Market API"));
        assert!(text.contains("IoT Sensor Network"));
        assert!(text.contains("encountered when processing"));
        assert!(text.contains("History: 48 hourly points"));
    }

    #[test]
    fn snapshot_carries_source_error_rates() {
        let sim = busy_simulation();
        let snapshot = sim.state().snapshot();

        for (row, source) in snapshot.sources.iter().zip(&sim.state().sources) {
            assert_eq!(&row.record, source);
            assert_eq!(source.failures, 3);
            assert!((row.error_rate - source.error_rate()).abs() < f64::EPSILON);
            assert!(row.error_rate > 0.0);
        }

        let text = render_text(&snapshot);
        let first = &snapshot.sources[0];
        assert!(text.contains(&format!("3 failures ({:>5.2}%)", first.error_rate)));
    }

    #[test]
    fn text_render_handles_empty_logs() {
        let sim = Simulation::new(1, start(), SimConfig::default());
        let text = render_text(&sim.state().snapshot());

        assert!(text.contains("No alerts to display."));
        assert!(text.contains("No events to display."));
    }

    #[test]
    fn json_render_is_valid() {
        let snapshot = busy_simulation().state().snapshot();
        let json = render(&snapshot, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["metrics"]["total_records_processed"].as_u64(),
            Some(snapshot.metrics.total_records_processed)
        );
        assert_eq!(value["sources"].as_array().map(Vec::len), Some(5));
        assert_eq!(value["sources"][0]["kind"], "stock_market");
        assert_eq!(
            value["sources"][0]["error_rate"].as_f64(),
            Some(snapshot.sources[0].error_rate)
        );
        assert!(value["alerts"][0]["severity"].is_string());
    }
}
