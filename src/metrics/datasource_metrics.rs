use crate::config::metrics_config::MetricCategory;
use crate::metrics::config_manager::is_metric_enabled;
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, GaugeVec,
    HistogramVec,
};
use std::time::Duration;
use tracing::debug;

lazy_static! {
    /// Upstream fetch count by provider and outcome
    static ref FETCH_COUNT: CounterVec = register_counter_vec!(
        "meteolink_upstream_fetches_total",
        "Total number of upstream fetches",
        &["provider", "outcome"]
    ).expect("Failed to create fetch_count metric");

    /// Upstream fetch duration histogram
    static ref FETCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "meteolink_upstream_fetch_duration_seconds",
        "Upstream fetch duration in seconds",
        &["provider", "outcome"],
        // Buckets: 10ms to 30s
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).expect("Failed to create fetch_duration metric");

    /// Response size histogram in bytes
    static ref RESPONSE_SIZE_BYTES: HistogramVec = register_histogram_vec!(
        "meteolink_upstream_response_size_bytes",
        "Upstream response size in bytes",
        &["provider"],
        // Buckets: 100B to 10MB
        vec![100.0, 1000.0, 10000.0, 100000.0, 1000000.0, 10000000.0]
    ).expect("Failed to create response_size metric");

    /// Payload parse errors
    static ref PARSE_ERROR_COUNT: CounterVec = register_counter_vec!(
        "meteolink_upstream_parse_errors_total",
        "Total number of upstream payload parse errors",
        &["provider", "error_type"]
    ).expect("Failed to create parse_error_count metric");

    /// Stations per status in the latest snapshot
    static ref STATION_STATUS: GaugeVec = register_gauge_vec!(
        "meteolink_stations",
        "Stations in the latest snapshot by status",
        &["provider", "status"]
    ).expect("Failed to create station_status metric");

    /// Aggregation cycle duration
    static ref SNAPSHOT_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "meteolink_snapshot_duration_seconds",
        "Time to aggregate one provider snapshot",
        &["provider"],
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    ).expect("Failed to create snapshot_duration metric");
}

/// Upstream metrics collector
pub struct DatasourceMetrics;

impl DatasourceMetrics {
    /// Record one upstream fetch; `outcome` is "success" or an error kind
    pub fn record_fetch(provider: &str, outcome: &str, duration: Duration) {
        if !is_metric_enabled(MetricCategory::Upstream) {
            return;
        }

        FETCH_COUNT.with_label_values(&[provider, outcome]).inc();
        FETCH_DURATION_SECONDS
            .with_label_values(&[provider, outcome])
            .observe(duration.as_secs_f64());

        debug!(
            "Recorded fetch for {}: outcome={}, duration={:?}",
            provider, outcome, duration
        );
    }

    /// Record the size of a successful response
    pub fn record_response_size(provider: &str, bytes: usize) {
        if !is_metric_enabled(MetricCategory::Upstream) {
            return;
        }

        RESPONSE_SIZE_BYTES
            .with_label_values(&[provider])
            .observe(bytes as f64);
    }

    /// Record a payload that could not be parsed
    pub fn record_parse_error(provider: &str, error_type: &str) {
        if !is_metric_enabled(MetricCategory::Upstream) {
            return;
        }

        PARSE_ERROR_COUNT
            .with_label_values(&[provider, error_type])
            .inc();
    }

    /// Record the outcome of an aggregation cycle
    pub fn record_snapshot(provider: &str, active: usize, inactive: usize, duration: Duration) {
        if !is_metric_enabled(MetricCategory::Upstream) {
            return;
        }

        STATION_STATUS
            .with_label_values(&[provider, "active"])
            .set(active as f64);
        STATION_STATUS
            .with_label_values(&[provider, "inactive"])
            .set(inactive as f64);
        SNAPSHOT_DURATION_SECONDS
            .with_label_values(&[provider])
            .observe(duration.as_secs_f64());
    }
}
