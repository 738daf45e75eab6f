pub mod config_manager;
pub mod datasource_metrics;
pub mod storage_metrics;

pub use config_manager::init_metrics_config;
pub use datasource_metrics::DatasourceMetrics;
pub use storage_metrics::StorageMetrics;

use prometheus::{Encoder, TextEncoder};

/// Renders every registered metric in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
