use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::models::ServiceError;
use crate::aggregator::{SnapshotAggregator, SnapshotCache};
use crate::archive::{DailyArchive, DailyArchiveStore, RollingLog, RollingLogStore};
use crate::config::{MeteolinkConfig, ProviderConfig};
use crate::providers::{FetchScope, HttpSourceAdapter, SourceAdapter};
use crate::readings::{Reading, Snapshot};

/// Outbound API over every configured provider
///
/// Snapshots are served from a short-lived cache; archives and rolling
/// logs are read straight from durable storage.
pub struct MeteoService {
    config: Arc<MeteolinkConfig>,
    aggregators: HashMap<String, SnapshotAggregator>,
    cache: SnapshotCache,
    archive: Arc<DailyArchiveStore>,
    rolling: Arc<RollingLogStore>,
}

impl MeteoService {
    /// Builds HTTP adapters for every configured provider
    pub fn from_config(config: MeteolinkConfig) -> Result<Self, ServiceError> {
        let mut adapters: HashMap<String, Arc<dyn SourceAdapter>> = HashMap::new();
        for provider in &config.providers {
            let adapter = HttpSourceAdapter::from_config(provider)?;
            adapters.insert(provider.id.clone(), Arc::new(adapter));
        }
        Self::with_adapters(config, adapters)
    }

    /// Builds the service over caller-supplied adapters, one per provider id
    pub fn with_adapters(
        config: MeteolinkConfig,
        mut adapters: HashMap<String, Arc<dyn SourceAdapter>>,
    ) -> Result<Self, ServiceError> {
        let tz = config.storage.tz().map_err(ServiceError::Config)?;
        let data_dir = config.storage.data_dir.clone();

        let mut aggregators = HashMap::new();
        for provider in &config.providers {
            let adapter = adapters
                .remove(&provider.id)
                .ok_or_else(|| ServiceError::UnknownProvider(provider.id.clone()))?;
            aggregators.insert(
                provider.id.clone(),
                SnapshotAggregator::new(provider.clone(), adapter),
            );
        }

        info!(
            "Meteo service ready with {} provider(s), data under {:?}",
            aggregators.len(),
            data_dir
        );

        Ok(Self {
            cache: SnapshotCache::new(Duration::from_secs(config.snapshot_cache_ttl_secs)),
            archive: Arc::new(DailyArchiveStore::new(&data_dir, tz)),
            rolling: Arc::new(RollingLogStore::new(&data_dir, config.storage.rolling_capacity)),
            config: Arc::new(config),
            aggregators,
        })
    }

    pub fn config(&self) -> &MeteolinkConfig {
        &self.config
    }

    pub fn archive(&self) -> &Arc<DailyArchiveStore> {
        &self.archive
    }

    pub fn rolling(&self) -> &Arc<RollingLogStore> {
        &self.rolling
    }

    /// The provider's snapshot, reused while younger than the cache TTL
    pub async fn get_snapshot(&self, provider_id: &str) -> Result<Arc<Snapshot>, ServiceError> {
        let aggregator = self.aggregator(provider_id)?;
        if let Some(snapshot) = self.cache.get(provider_id).await {
            return Ok(snapshot);
        }
        Ok(self.cache.insert(aggregator.aggregate().await).await)
    }

    /// Aggregates afresh and replaces the cached snapshot
    pub async fn refresh_snapshot(&self, provider_id: &str) -> Result<Arc<Snapshot>, ServiceError> {
        let aggregator = self.aggregator(provider_id)?;
        Ok(self.cache.insert(aggregator.aggregate().await).await)
    }

    /// One station's current reading
    ///
    /// Per-station providers fetch just that station. Network providers are
    /// answered from the provider snapshot, which also resolves stations
    /// found by discovery.
    pub async fn get_single_station(
        &self,
        provider_id: &str,
        station_id: &str,
    ) -> Result<Reading, ServiceError> {
        let aggregator = self.aggregator(provider_id)?;
        let provider = aggregator.provider();

        if aggregator.scope() == FetchScope::PerStation {
            let station = provider
                .station(station_id)
                .ok_or_else(|| unknown_station(provider_id, station_id))?;
            return Ok(aggregator.read_station(station).await);
        }

        if !provider.is_discovery() && provider.station(station_id).is_none() {
            return Err(unknown_station(provider_id, station_id));
        }

        let snapshot = self.get_snapshot(provider_id).await?;
        snapshot
            .reading(station_id)
            .cloned()
            .ok_or_else(|| unknown_station(provider_id, station_id))
    }

    /// A station's date/hour archive
    pub async fn get_archive(
        &self,
        provider_id: &str,
        station_id: &str,
    ) -> Result<DailyArchive, ServiceError> {
        let provider = self.provider(provider_id)?;
        if provider.is_discovery() {
            let known = self.archive.stations(provider_id).await?;
            if !known.iter().any(|s| s == station_id) {
                return Err(unknown_station(provider_id, station_id));
            }
        } else if provider.station(station_id).is_none() {
            return Err(unknown_station(provider_id, station_id));
        }

        debug!("Loading archive of {}/{}", provider_id, station_id);
        Ok(self.archive.load(provider_id, station_id).await?)
    }

    /// A station's rolling log, oldest entry first
    pub async fn get_rolling_log(
        &self,
        provider_id: &str,
        station_id: &str,
    ) -> Result<RollingLog, ServiceError> {
        let provider = self.provider(provider_id)?;
        if !provider.is_discovery() && provider.station(station_id).is_none() {
            return Err(unknown_station(provider_id, station_id));
        }

        let log = self.rolling.load(provider_id, station_id).await?;
        if provider.is_discovery() && log.is_empty() {
            return Err(unknown_station(provider_id, station_id));
        }
        Ok(log)
    }

    fn aggregator(&self, provider_id: &str) -> Result<&SnapshotAggregator, ServiceError> {
        self.aggregators
            .get(provider_id)
            .ok_or_else(|| ServiceError::UnknownProvider(provider_id.to_string()))
    }

    fn provider(&self, provider_id: &str) -> Result<&ProviderConfig, ServiceError> {
        self.config
            .provider(provider_id)
            .ok_or_else(|| ServiceError::UnknownProvider(provider_id.to_string()))
    }
}

fn unknown_station(provider: &str, station: &str) -> ServiceError {
    ServiceError::UnknownStation {
        provider: provider.to_string(),
        station: station.to_string(),
    }
}
