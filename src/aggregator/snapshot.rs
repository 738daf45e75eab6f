use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::{ProviderConfig, StationConfig};
use crate::metrics::DatasourceMetrics;
use crate::providers::{AdapterError, FetchScope, RawRecord, SourceAdapter};
use crate::readings::{normalize, Reading, Snapshot, SnapshotEntry, StationStatus};

/// Builds one provider's snapshot from its adapter and station registry
///
/// Every unit of upstream work (one station document, or the whole network
/// payload) is bounded by the provider's timeout. Failures never abort the
/// snapshot; the affected stations come back inactive.
pub struct SnapshotAggregator {
    provider: ProviderConfig,
    adapter: Arc<dyn SourceAdapter>,
}

impl SnapshotAggregator {
    pub fn new(provider: ProviderConfig, adapter: Arc<dyn SourceAdapter>) -> Self {
        Self { provider, adapter }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    pub fn scope(&self) -> FetchScope {
        self.adapter.descriptor().scope()
    }

    /// Runs one aggregation cycle
    ///
    /// The snapshot timestamp is taken before any fetch starts.
    pub async fn aggregate(&self) -> Snapshot {
        let timestamp = Utc::now();
        let started = Instant::now();

        let entries = match self.scope() {
            FetchScope::PerStation => self.collect_per_station().await,
            FetchScope::Network => self.collect_network().await,
        };

        let snapshot = Snapshot::new(self.provider.id.clone(), timestamp, entries);
        let active = snapshot.count_status(StationStatus::Active);
        let inactive = snapshot.count_status(StationStatus::Inactive);
        DatasourceMetrics::record_snapshot(&self.provider.id, active, inactive, started.elapsed());

        info!(
            "[{}] Snapshot complete: {} stations ({} active, {} inactive) in {:?}",
            self.provider.id,
            snapshot.len(),
            active,
            inactive,
            started.elapsed()
        );
        snapshot
    }

    /// Fetches and normalizes a single configured station of a per-station provider
    pub async fn read_station(&self, station: &StationConfig) -> Reading {
        let descriptor = self.adapter.descriptor();

        match self.with_deadline(self.adapter.fetch_station(station)).await {
            Ok(raw) => normalize(descriptor, &raw),
            Err(e) => {
                warn!(
                    "[{}] Station '{}' unavailable: {}",
                    self.provider.id, station.id, e
                );
                Reading::inactive(station.display_name.clone())
            }
        }
    }

    async fn collect_per_station(&self) -> Vec<SnapshotEntry> {
        let concurrency = self.provider.max_concurrency.max(1);
        debug!(
            "[{}] Fetching {} stations, {} at a time",
            self.provider.id,
            self.provider.stations.len(),
            concurrency
        );

        let fetches: Vec<_> = self
            .provider
            .stations
            .iter()
            .map(|station| async move {
                SnapshotEntry {
                    station_id: station.id.clone(),
                    reading: self.read_station(station).await,
                }
            })
            .collect();

        // `buffered` yields in input order, whatever order fetches complete in
        stream::iter(fetches)
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn collect_network(&self) -> Vec<SnapshotEntry> {
        let records = match self.with_deadline(self.adapter.fetch_network()).await {
            Ok(records) => records,
            Err(e) => {
                warn!("[{}] Network fetch failed: {}", self.provider.id, e);
                Vec::new()
            }
        };

        if self.provider.is_discovery() {
            self.discovered_entries(&records)
        } else {
            self.registry_entries(&records)
        }
    }

    /// One entry per upstream station key, in upstream order
    fn discovered_entries(&self, records: &[RawRecord]) -> Vec<SnapshotEntry> {
        let descriptor = self.adapter.descriptor();
        let mut seen = HashSet::with_capacity(records.len());
        records
            .iter()
            .filter(|raw| {
                let first = seen.insert(raw.station_key.as_str());
                if !first {
                    debug!(
                        "[{}] Ignoring repeated row for station '{}'",
                        self.provider.id, raw.station_key
                    );
                }
                first
            })
            .map(|raw| SnapshotEntry {
                station_id: raw.station_key.clone(),
                reading: normalize(descriptor, raw),
            })
            .collect()
    }

    /// One entry per configured station, in configuration order
    fn registry_entries(&self, records: &[RawRecord]) -> Vec<SnapshotEntry> {
        let descriptor = self.adapter.descriptor();

        let mut by_key: HashMap<&str, &RawRecord> = HashMap::with_capacity(records.len());
        for raw in records {
            // First row wins when the upstream repeats a key
            by_key.entry(raw.station_key.as_str()).or_insert(raw);
        }

        self.provider
            .stations
            .iter()
            .map(|station| {
                let reading = match by_key.get(station.upstream_key()) {
                    Some(raw) => normalize(descriptor, &(*raw).clone().with_station(station)),
                    None => {
                        debug!(
                            "[{}] Station '{}' not published upstream",
                            self.provider.id, station.id
                        );
                        Reading::inactive(station.display_name.clone())
                    }
                };
                SnapshotEntry {
                    station_id: station.id.clone(),
                    reading,
                }
            })
            .collect()
    }

    async fn with_deadline<T>(
        &self,
        work: impl Future<Output = Result<T, AdapterError>>,
    ) -> Result<T, AdapterError> {
        let limit = self.provider.timeout_secs;
        tokio::time::timeout(Duration::from_secs(limit), work)
            .await
            .unwrap_or(Err(AdapterError::Timeout(limit)))
    }
}
