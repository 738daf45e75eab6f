use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::descriptor::{Layout, ProviderDescriptor, SensorTable};
use super::extractor::JsonExtractor;
use super::fetcher::Fetcher;
use super::layouts::{record_list, sensor_tables, station_document, ScriptArrays};
use super::models::{AdapterError, RawRecord, SourceAdapter};
use crate::config::{ProviderConfig, StationConfig};

/// Generic HTTP adapter driven by a provider descriptor
pub struct HttpSourceAdapter {
    descriptor: ProviderDescriptor,
    fetcher: Fetcher,
}

impl HttpSourceAdapter {
    pub fn new(descriptor: ProviderDescriptor, timeout_secs: u64) -> Result<Self, AdapterError> {
        let fetcher = Fetcher::new(&descriptor.id, timeout_secs)?;
        Ok(Self {
            descriptor,
            fetcher,
        })
    }

    /// Builds the adapter for a configured provider from its built-in descriptor
    pub fn from_config(config: &ProviderConfig) -> Result<Self, AdapterError> {
        let descriptor =
            ProviderDescriptor::builtin(&config.id, config.kind, config.base_url.as_deref());
        Self::new(descriptor, config.timeout_secs)
    }

    fn unsupported(&self, operation: &'static str) -> AdapterError {
        AdapterError::Unsupported {
            provider: self.descriptor.id.clone(),
            operation,
        }
    }

    async fn fetch_sensor_tables(
        &self,
        stations_url: &str,
        tables: &[SensorTable],
    ) -> Result<Vec<Value>, AdapterError> {
        let stations = self.fetcher.fetch_json(stations_url).await?;

        let indexed: Vec<(String, HashMap<String, Value>)> =
            futures::future::try_join_all(tables.iter().map(|table| async move {
                let document = self.fetcher.fetch_json(&table.url).await?;
                Ok::<_, AdapterError>((
                    table.name.clone(),
                    sensor_tables::index_table(&document, &table.rows_path, &table.key_path),
                ))
            }))
            .await?;

        sensor_tables::merge(&stations, &indexed, &self.descriptor.station_key)
    }

    /// Resolves each body's station key, dropping rows outside the key prefixes
    fn keyed_records(&self, bodies: Vec<Value>, key_prefixes: &[String]) -> Vec<RawRecord> {
        let total = bodies.len();
        let records: Vec<RawRecord> = bodies
            .into_iter()
            .filter_map(|body| {
                let key = JsonExtractor::extract_text(&body, &self.descriptor.station_key)?;
                if !key_prefixes.is_empty() && !key_prefixes.iter().any(|p| key.starts_with(p.as_str())) {
                    return None;
                }
                Some(RawRecord::new(key, body))
            })
            .collect();

        debug!(
            "[{}] Kept {} of {} upstream rows",
            self.descriptor.id,
            records.len(),
            total
        );
        records
    }
}

#[async_trait::async_trait]
impl SourceAdapter for HttpSourceAdapter {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn fetch_station(&self, station: &StationConfig) -> Result<RawRecord, AdapterError> {
        match &self.descriptor.layout {
            Layout::StationDocument { url_template } => {
                let url = station_document::station_url(url_template, station.upstream_key())?;
                let document = self.fetcher.fetch_json(url.as_str()).await?;
                let body = station_document::check_document(document)?;
                Ok(RawRecord::new(station.id.clone(), body).with_station(station))
            }
            _ => Err(self.unsupported("per-station fetches")),
        }
    }

    async fn fetch_network(&self) -> Result<Vec<RawRecord>, AdapterError> {
        match &self.descriptor.layout {
            Layout::StationDocument { .. } => Err(self.unsupported("network fetches")),
            Layout::RecordList {
                url,
                records_path,
                key_prefixes,
            } => {
                let document = self.fetcher.fetch_json(url).await?;
                let bodies = record_list::split_records(&document, records_path.as_deref())?;
                Ok(self.keyed_records(bodies, key_prefixes))
            }
            Layout::ScriptArrays {
                url,
                coords_var,
                data_var,
            } => {
                let parser = ScriptArrays::new(coords_var, data_var)?;
                let page = self.fetcher.fetch_text(url).await?;
                let bodies = parser.parse(&page)?;
                Ok(self.keyed_records(bodies, &[]))
            }
            Layout::SensorTables {
                stations_url,
                tables,
            } => {
                let bodies = self.fetch_sensor_tables(stations_url, tables).await?;
                Ok(self.keyed_records(bodies, &[]))
            }
        }
    }
}
