use crate::config::metrics_config::MetricCategory;
use crate::metrics::config_manager::is_metric_enabled;
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    /// Durable writes by store and outcome
    static ref STORAGE_WRITES: CounterVec = register_counter_vec!(
        "meteolink_storage_writes_total",
        "Total number of archive and rolling log writes",
        &["store", "outcome"]
    ).expect("Failed to create storage_writes metric");

    /// Unreadable documents discarded and restarted empty
    static ref CORRUPT_RECOVERIES: CounterVec = register_counter_vec!(
        "meteolink_storage_corrupt_recoveries_total",
        "Total number of unreadable documents restarted from empty",
        &["store"]
    ).expect("Failed to create corrupt_recoveries metric");
}

/// Storage metrics collector
pub struct StorageMetrics;

impl StorageMetrics {
    /// Record a read-modify-write of one document
    pub fn record_write(store: &str, success: bool) {
        if !is_metric_enabled(MetricCategory::Storage) {
            return;
        }

        let outcome = if success { "success" } else { "failure" };
        STORAGE_WRITES.with_label_values(&[store, outcome]).inc();
    }

    /// Record a corrupt document that was discarded
    pub fn record_corrupt_recovery(store: &str) {
        if !is_metric_enabled(MetricCategory::Storage) {
            return;
        }

        CORRUPT_RECOVERIES.with_label_values(&[store]).inc();
    }
}
