use serde_json::Value;
use thiserror::Error;

use super::descriptor::ProviderDescriptor;
use crate::config::StationConfig;
use crate::readings::GeoPoint;

/// Reasons an upstream fetch produced no usable record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error with status code: {0}")]
    HttpStatus(u16),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid upstream URL '{0}'")]
    InvalidUrl(String),

    #[error("Provider '{provider}' does not support {operation}")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },
}

impl AdapterError {
    /// True for the failures that mean the upstream could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AdapterError::Network(_) | AdapterError::HttpStatus(_) | AdapterError::Timeout(_)
        )
    }

    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Network(_) => "network",
            AdapterError::HttpStatus(_) => "http_status",
            AdapterError::Timeout(_) => "timeout",
            AdapterError::MalformedPayload(_) => "malformed_payload",
            AdapterError::InvalidUrl(_) => "invalid_url",
            AdapterError::Unsupported { .. } => "unsupported",
        }
    }
}

/// One station's provider-native payload, still in upstream shape
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Key the upstream uses for the station
    pub station_key: String,

    /// Display name from the station registry, when configured
    pub display_name: Option<String>,

    /// Coordinates from the station registry, when configured
    pub registry_position: Option<GeoPoint>,

    /// Payload addressed by the descriptor's field paths
    pub body: Value,
}

impl RawRecord {
    pub fn new(station_key: impl Into<String>, body: Value) -> Self {
        Self {
            station_key: station_key.into(),
            display_name: None,
            registry_position: None,
            body,
        }
    }

    /// Attaches registry metadata for a configured station
    pub fn with_station(mut self, station: &StationConfig) -> Self {
        self.display_name = Some(station.display_name.clone());
        self.registry_position = Some(GeoPoint {
            latitude: station.latitude,
            longitude: station.longitude,
        });
        self
    }
}

/// Whether a provider is fetched one station at a time or as a whole network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScope {
    PerStation,
    Network,
}

/// Fetches raw provider records
///
/// Implementations never panic on upstream faults; every failure comes
/// back as an [`AdapterError`].
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Descriptor driving extraction and normalization for this provider
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Fetches one station's record
    async fn fetch_station(&self, station: &StationConfig) -> Result<RawRecord, AdapterError>;

    /// Fetches every station row the network publishes, in upstream order
    async fn fetch_network(&self) -> Result<Vec<RawRecord>, AdapterError>;

    /// Get the provider id
    fn name(&self) -> &str {
        &self.descriptor().id
    }
}
