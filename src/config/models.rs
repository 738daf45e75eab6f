use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use super::metrics_config::MetricsConfig;
use crate::constants::{network, storage, time};
use crate::readings::Field;

/// The main configuration structure for Meteolink
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MeteolinkConfig {
    /// Where and how station history is persisted
    #[serde(default)]
    #[validate]
    pub storage: StorageConfig,

    /// How long a served snapshot may be reused before re-aggregating
    #[serde(default = "default_snapshot_cache_ttl")]
    pub snapshot_cache_ttl_secs: u64,

    /// Log level used when RUST_LOG is not set
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Optional pruning of old archive dates
    #[serde(default)]
    #[validate]
    pub retention: RetentionConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Upstream station networks
    #[validate]
    pub providers: Vec<ProviderConfig>,
}

impl MeteolinkConfig {
    /// Looks up a provider by id
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }
}

/// Durable storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StorageConfig {
    /// Root directory of the archive and rolling log trees
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// IANA zone used for archive date and hour keys
    #[serde(default = "default_timezone")]
    #[validate(custom = "validate_timezone")]
    pub timezone: String,

    /// Number of entries kept in each rolling log
    #[serde(default = "default_rolling_capacity")]
    #[validate(range(min = 1))]
    pub rolling_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            timezone: default_timezone(),
            rolling_capacity: default_rolling_capacity(),
        }
    }
}

impl StorageConfig {
    /// Parses the configured zone
    pub fn tz(&self) -> Result<chrono_tz::Tz, String> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| format!("Invalid timezone '{}': {}", self.timezone, e))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. "info" or "meteolink=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration for the archive retention job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetentionConfig {
    /// Whether the retention job runs (default: false, archives grow unbounded)
    #[serde(default)]
    pub enabled: bool,

    /// Cron schedule for the job (default: "0 30 3 * * *")
    #[serde(default = "default_retention_schedule")]
    #[validate(custom = "validate_cron_schedule")]
    pub schedule: String,

    /// Calendar days kept, counting today
    #[serde(default = "default_retention_days")]
    #[validate(range(min = 1))]
    pub keep_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            schedule: default_retention_schedule(),
            keep_days: default_retention_days(),
        }
    }
}

/// Supported upstream networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Centro Meteo Lombardo, inline script arrays with planar coordinates
    Cml,
    /// OMIRL (Liguria), station list merged with sensor tables
    Omirl,
    /// TorinoMeteo realtime JSON list
    Torinometeo,
    /// Meteo3R GeoJSON, geofenced to Piedmont and Aosta Valley
    Meteo3r,
    /// LIMET, one Cumulus document per station
    Limet,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Cml => "cml",
            ProviderKind::Omirl => "omirl",
            ProviderKind::Torinometeo => "torinometeo",
            ProviderKind::Meteo3r => "meteo3r",
            ProviderKind::Limet => "limet",
        };
        f.write_str(name)
    }
}

/// Configuration of a single upstream network
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProviderConfig {
    /// Unique provider id, used in file paths and API calls
    #[validate(length(min = 1))]
    pub id: String,

    /// Which wire format the provider speaks
    pub kind: ProviderKind,

    /// Whether the collector polls this provider
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Override of the upstream URL (template for per-station providers)
    #[serde(default)]
    #[validate(custom = "validate_base_url")]
    pub base_url: Option<String>,

    /// Per-fetch timeout in seconds
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,

    /// Maximum concurrent per-station fetches
    #[serde(default = "default_max_concurrency")]
    #[validate(range(min = 1, max = 64))]
    pub max_concurrency: usize,

    /// Interval between aggregation cycles in seconds
    #[serde(default = "default_poll_interval")]
    #[validate(range(min = 10))]
    pub poll_interval_secs: u64,

    /// What the collector persists for this provider
    #[serde(default)]
    pub persist: PersistConfig,

    /// Station registry, in snapshot order
    #[serde(default)]
    #[validate]
    pub stations: Vec<StationConfig>,
}

impl ProviderConfig {
    /// Looks up a configured station by id
    pub fn station(&self, id: &str) -> Option<&StationConfig> {
        self.stations.iter().find(|s| s.id == id)
    }

    /// True when no registry is configured and upstream rows are taken as-is
    pub fn is_discovery(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Persistence switches for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Append samples to the date/hour archive
    #[serde(default = "default_true")]
    pub daily_archive: bool,

    /// Append readings to the rolling log
    #[serde(default = "default_true")]
    pub rolling_log: bool,

    /// Reading field sampled into the date/hour archive
    #[serde(default = "default_sample_field")]
    pub sample_field: Field,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            daily_archive: true,
            rolling_log: true,
            sample_field: default_sample_field(),
        }
    }
}

/// Static registry entry for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationConfig {
    /// Unique key inside the provider
    #[validate(length(min = 1), custom = "validate_station_id")]
    pub id: String,

    /// Human-facing name
    pub display_name: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Provider-specific link, slug or code (defaults to the id)
    #[serde(default)]
    pub upstream_ref: Option<String>,
}

impl StationConfig {
    /// The key this station is known by upstream
    pub fn upstream_key(&self) -> &str {
        self.upstream_ref.as_deref().unwrap_or(&self.id)
    }
}

fn default_true() -> bool {
    true
}

fn default_snapshot_cache_ttl() -> u64 {
    time::DEFAULT_SNAPSHOT_CACHE_TTL_SECS
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(storage::DEFAULT_DATA_DIR)
}

fn default_timezone() -> String {
    storage::DEFAULT_TIMEZONE.to_string()
}

fn default_rolling_capacity() -> usize {
    storage::DEFAULT_ROLLING_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_retention_schedule() -> String {
    time::DEFAULT_RETENTION_SCHEDULE.to_string()
}

fn default_retention_days() -> u32 {
    time::DEFAULT_RETENTION_DAYS
}

fn default_timeout() -> u64 {
    network::DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_max_concurrency() -> usize {
    network::DEFAULT_MAX_CONCURRENCY
}

fn default_poll_interval() -> u64 {
    time::DEFAULT_POLL_INTERVAL_SECS
}

fn default_sample_field() -> Field {
    Field::Temperature
}

fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    chrono_tz::Tz::from_str(timezone)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_timezone"))
}

fn validate_cron_schedule(schedule: &str) -> Result<(), ValidationError> {
    cron::Schedule::from_str(schedule)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_cron_schedule"))
}

fn validate_base_url(base_url: &str) -> Result<(), ValidationError> {
    // Per-station templates carry a "{ref}" placeholder that is not a valid URL yet
    let candidate = base_url.replace("{ref}", "station");
    url::Url::parse(&candidate)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_base_url"))
}

fn validate_station_id(id: &str) -> Result<(), ValidationError> {
    if id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(ValidationError::new("station_id_not_a_file_name"));
    }
    Ok(())
}
