use crate::config::metrics_config::{MetricCategory, MetricsConfig};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Global metrics configuration
static METRICS_CONFIG: OnceCell<Arc<MetricsConfig>> = OnceCell::new();

/// Initialize the global metrics configuration
///
/// Only the first call takes effect; later calls are ignored.
pub fn init_metrics_config(config: MetricsConfig) {
    if METRICS_CONFIG.set(Arc::new(config)).is_err() {
        debug!("Metrics config already initialized, keeping the first one");
    }
}

/// Check if a metric category is enabled
pub fn is_metric_enabled(category: MetricCategory) -> bool {
    METRICS_CONFIG
        .get()
        .map(|config| config.is_category_enabled(category))
        .unwrap_or(true) // Default to enabled if not initialized
}
