//! Test data factories for creating common test objects

use std::path::Path;

use crate::config::metrics_config::MetricsConfig;
use crate::config::{
    LoggingConfig, MeteolinkConfig, PersistConfig, ProviderConfig, ProviderKind, RetentionConfig,
    StationConfig, StorageConfig,
};
use crate::providers::{
    CoordinateSource, FieldMapping, InactivityRule, Layout, ProviderDescriptor, Sentinel,
};
use crate::readings::{Field, GeoPoint, Reading, SensorValues};

/// Factory for creating StationConfig test objects
pub struct StationConfigFactory;

impl StationConfigFactory {
    /// Create a station whose display name equals its id
    pub fn create(id: &str, latitude: f64, longitude: f64) -> StationConfig {
        StationConfig {
            id: id.to_string(),
            display_name: id.to_string(),
            latitude,
            longitude,
            upstream_ref: None,
        }
    }

    /// Create a station known upstream under another key
    pub fn with_ref(id: &str, upstream_ref: &str) -> StationConfig {
        StationConfig {
            upstream_ref: Some(upstream_ref.to_string()),
            ..Self::create(id, 44.4, 8.9)
        }
    }

    /// Create `count` stations named `<prefix>0`, `<prefix>1`, ...
    pub fn create_many(prefix: &str, count: usize) -> Vec<StationConfig> {
        (0..count)
            .map(|i| Self::create(&format!("{}{}", prefix, i), 44.0 + i as f64 / 100.0, 8.9))
            .collect()
    }
}

/// Factory for creating ProviderConfig test objects
pub struct ProviderConfigFactory;

impl ProviderConfigFactory {
    /// Create a provider with default tuning
    pub fn create(id: &str, kind: ProviderKind, stations: Vec<StationConfig>) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            kind,
            enabled: true,
            base_url: None,
            timeout_secs: 2,
            max_concurrency: 4,
            poll_interval_secs: 600,
            persist: PersistConfig::default(),
            stations,
        }
    }

    /// Create a per-station provider
    pub fn limet(id: &str, stations: Vec<StationConfig>) -> ProviderConfig {
        Self::create(id, ProviderKind::Limet, stations)
    }
}

/// Factory for creating MeteolinkConfig test objects
pub struct MeteolinkConfigFactory;

impl MeteolinkConfigFactory {
    /// Create a configuration persisting under `data_dir`
    pub fn create(data_dir: &Path, providers: Vec<ProviderConfig>) -> MeteolinkConfig {
        MeteolinkConfig {
            storage: StorageConfig {
                data_dir: data_dir.to_path_buf(),
                ..StorageConfig::default()
            },
            snapshot_cache_ttl_secs: 60,
            logging: LoggingConfig::default(),
            retention: RetentionConfig::default(),
            metrics: MetricsConfig::default(),
            providers,
        }
    }
}

/// Factory for hand-built provider descriptors
pub struct DescriptorFactory;

impl DescriptorFactory {
    /// One `{"temp": .., "hum": .., "status": ..}` document per station
    ///
    /// `status == "1"` marks the station inactive; coordinates come from the registry.
    pub fn station_document(id: &str, url_template: &str) -> ProviderDescriptor {
        ProviderDescriptor {
            id: id.to_string(),
            layout: Layout::StationDocument {
                url_template: url_template.to_string(),
            },
            station_key: Vec::new(),
            name: Vec::new(),
            fields: vec![
                FieldMapping {
                    field: Field::Temperature,
                    paths: vec!["temp".to_string()],
                },
                FieldMapping {
                    field: Field::Humidity,
                    paths: vec!["hum".to_string()],
                },
            ],
            coordinates: CoordinateSource::Registry,
            inactivity: InactivityRule {
                sentinel: Some(Sentinel {
                    path: "status".to_string(),
                    inactive_value: "1".to_string(),
                }),
                activity_fields: Vec::new(),
            },
        }
    }

    /// A list of `{"id", "name", "temp", "lat", "lon"}` rows
    pub fn record_list(id: &str, url: &str) -> ProviderDescriptor {
        ProviderDescriptor {
            id: id.to_string(),
            layout: Layout::RecordList {
                url: url.to_string(),
                records_path: None,
                key_prefixes: Vec::new(),
            },
            station_key: vec!["id".to_string()],
            name: vec!["name".to_string(), "id".to_string()],
            fields: vec![FieldMapping {
                field: Field::Temperature,
                paths: vec!["temp".to_string()],
            }],
            coordinates: CoordinateSource::Geographic {
                latitude: "lat".to_string(),
                longitude: "lon".to_string(),
            },
            inactivity: InactivityRule {
                sentinel: None,
                activity_fields: vec![Field::Temperature],
            },
        }
    }
}

/// Factory for creating Reading test objects
pub struct ReadingFactory;

impl ReadingFactory {
    /// Create an active reading carrying only a temperature
    pub fn with_temperature(name: &str, temperature: f64) -> Reading {
        let mut values = SensorValues::default();
        values.set(Field::Temperature, Some(temperature));
        Reading::active(
            name,
            values,
            Some(GeoPoint {
                latitude: 44.4,
                longitude: 8.9,
            }),
        )
    }

    /// Create an active reading without the archived sample field
    pub fn with_humidity_only(name: &str, humidity: f64) -> Reading {
        let mut values = SensorValues::default();
        values.set(Field::Humidity, Some(humidity));
        Reading::active(name, values, None)
    }
}
