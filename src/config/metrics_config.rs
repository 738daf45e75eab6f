use serde::{Deserialize, Serialize};

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics collection
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Category-specific configuration
    #[serde(default)]
    pub categories: MetricCategories,
}

/// Individual metric category toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCategories {
    /// Upstream fetch health and station status metrics
    #[serde(default = "default_true")]
    pub upstream: bool,

    /// Archive and rolling log write metrics
    #[serde(default = "default_true")]
    pub storage: bool,
}

/// Metric categories that can be toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    Upstream,
    Storage,
}

impl MetricsConfig {
    /// Whether a category is recorded under this configuration
    pub fn is_category_enabled(&self, category: MetricCategory) -> bool {
        if !self.enabled {
            return false;
        }
        match category {
            MetricCategory::Upstream => self.categories.upstream,
            MetricCategory::Storage => self.categories.storage,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            categories: MetricCategories::default(),
        }
    }
}

impl Default for MetricCategories {
    fn default() -> Self {
        Self {
            upstream: true,
            storage: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_true() -> bool {
    true
}
