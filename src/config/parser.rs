use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use validator::Validate;

use super::models::{MeteolinkConfig, ProviderKind};

/// Errors that can occur during configuration parsing
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Other(String),
}

/// Provides default configuration file path
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".meteolink")
        .join("config.yaml")
}

/// Loads and validates the Meteolink configuration
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<MeteolinkConfig, ConfigError> {
    let mut file = File::open(&config_path).map_err(ConfigError::FileError)?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(ConfigError::FileError)?;

    parse_config(&content)
}

/// Parses and validates configuration from YAML text
pub fn parse_config(content: &str) -> Result<MeteolinkConfig, ConfigError> {
    let config: MeteolinkConfig = serde_yaml::from_str(content).map_err(ConfigError::ParseError)?;

    config.validate().map_err(ConfigError::ValidationError)?;

    check_cross_references(&config)?;

    Ok(config)
}

fn check_cross_references(config: &MeteolinkConfig) -> Result<(), ConfigError> {
    let mut provider_ids = HashSet::new();

    for provider in &config.providers {
        if !provider_ids.insert(provider.id.as_str()) {
            return Err(ConfigError::Other(format!(
                "Provider '{}' is defined more than once",
                provider.id
            )));
        }

        if provider.id.contains(['/', '\\']) {
            return Err(ConfigError::Other(format!(
                "Provider id '{}' must not contain path separators",
                provider.id
            )));
        }

        // LIMET has no network-wide endpoint to discover stations from
        if provider.kind == ProviderKind::Limet && provider.stations.is_empty() {
            return Err(ConfigError::Other(format!(
                "Provider '{}' fetches per station and needs at least one configured station",
                provider.id
            )));
        }

        let mut station_ids = HashSet::new();
        for station in &provider.stations {
            if !station_ids.insert(station.id.as_str()) {
                return Err(ConfigError::Other(format!(
                    "Station '{}' is defined more than once in provider '{}'",
                    station.id, provider.id
                )));
            }

            if !(-90.0..=90.0).contains(&station.latitude)
                || !(-180.0..=180.0).contains(&station.longitude)
            {
                return Err(ConfigError::Other(format!(
                    "Station '{}' in provider '{}' has out-of-range coordinates ({}, {})",
                    station.id, provider.id, station.latitude, station.longitude
                )));
            }
        }
    }

    config
        .storage
        .tz()
        .map_err(ConfigError::Other)?;

    Ok(())
}
