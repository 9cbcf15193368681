//! Prometheus metrics for hbdash.
//!
//! Covers:
//! - Endpoint probing outcomes per resource
//! - Refresh cycle duration and result
//! - Panel sizes and the running-bot headline
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on duplicate
//! metric names, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_histogram_vec,
    register_int_gauge, register_int_gauge_vec, CounterVec, Encoder, Gauge, Histogram,
    HistogramVec, IntGauge, IntGaugeVec, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Probe results by resource.
/// Labels: resource, outcome (resolved/empty/failed)
pub static PROBES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hbdash_probes_total",
        "Endpoint probe results by resource",
        &["resource", "outcome"]
    )
    .unwrap()
});

/// Candidates requested before a probe finished.
pub static PROBE_CANDIDATES: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "hbdash_probe_candidates",
        "Candidate paths requested per probe",
        &["resource"],
        vec![1.0, 2.0, 3.0, 4.0, 5.0]
    )
    .unwrap()
});

/// Refresh cycle duration in seconds.
pub static CYCLE_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "hbdash_cycle_duration_seconds",
        "Refresh cycle duration in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .unwrap()
});

/// Refresh cycles by result.
/// Labels: result (ok/fatal)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hbdash_cycles_total",
        "Refresh cycles by result",
        &["result"]
    )
    .unwrap()
});

/// Unix time of the last finished cycle.
pub static LAST_CYCLE_TIMESTAMP: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "hbdash_last_cycle_timestamp_seconds",
        "Unix time of the last finished refresh cycle"
    )
    .unwrap()
});

/// Rows shown per panel.
pub static PANEL_ROWS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "hbdash_panel_rows",
        "Rows in the most recent table per resource",
        &["resource"]
    )
    .unwrap()
});

/// Running bots/instances headline.
pub static FLEET_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("hbdash_fleet_running", "Bots or instances counted as running").unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record one finished probe.
    pub fn probe(resource: &str, outcome: &str, attempts: usize) {
        PROBES_TOTAL.with_label_values(&[resource, outcome]).inc();
        PROBE_CANDIDATES
            .with_label_values(&[resource])
            .observe(attempts as f64);
    }

    /// Record one finished cycle.
    pub fn cycle(fatal: bool, duration_secs: f64, finished_at_secs: f64) {
        let result = if fatal { "fatal" } else { "ok" };
        CYCLES_TOTAL.with_label_values(&[result]).inc();
        CYCLE_DURATION_SECONDS.observe(duration_secs);
        LAST_CYCLE_TIMESTAMP.set(finished_at_secs);
    }

    pub fn panel_rows(resource: &str, rows: usize) {
        PANEL_ROWS
            .with_label_values(&[resource])
            .set(i64::try_from(rows).unwrap_or(i64::MAX));
    }

    pub fn fleet_running(count: usize) {
        FLEET_RUNNING.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the default registry in the Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_metrics_are_exported() {
        Metrics::probe("orders", "resolved", 2);
        Metrics::cycle(false, 0.3, 1_700_000_000.0);
        Metrics::panel_rows("orders", 12);
        Metrics::fleet_running(3);

        let text = Metrics::gather_text().unwrap();
        assert!(text.contains("hbdash_probes_total"));
        assert!(text.contains("hbdash_cycles_total"));
        assert!(text.contains("hbdash_panel_rows{resource=\"orders\"} 12"));
        assert!(text.contains("hbdash_fleet_running 3"));
    }
}
