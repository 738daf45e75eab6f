use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::archive::{RollingEntry, StorageError};
use crate::config::ProviderConfig;
use crate::readings::{Snapshot, SnapshotEntry};
use crate::service::{MeteoService, ServiceError};

/// Outcome of one collection cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub stations: usize,
    pub archived: usize,
    pub logged: usize,
    pub failed_writes: usize,
}

/// Polls a single provider at its configured interval
pub struct ProviderMonitor {
    provider: ProviderConfig,
    service: Arc<MeteoService>,
}

impl ProviderMonitor {
    pub fn new(provider: ProviderConfig, service: Arc<MeteoService>) -> Self {
        Self { provider, service }
    }

    /// Runs cycles until the shutdown signal flips
    ///
    /// The signal is only observed between cycles, so a cycle that has
    /// started always finishes its writes.
    pub async fn start(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(Duration::from_secs(self.provider.poll_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting provider monitor for '{}' with {}s interval",
            self.provider.id, self.provider.poll_interval_secs
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("Provider {}: cycle failed: {}", self.provider.id, e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Provider monitor for '{}' stopping", self.provider.id);
                        break;
                    }
                }
            }
        }
    }

    /// Aggregates a fresh snapshot and persists it
    pub async fn run_cycle(&self) -> Result<CycleReport, ServiceError> {
        let snapshot = self.service.refresh_snapshot(&self.provider.id).await?;
        let report = self.persist(&snapshot).await;

        info!(
            "Provider {}: {} stations, {} archived, {} logged, {} failed writes",
            self.provider.id, report.stations, report.archived, report.logged, report.failed_writes
        );
        Ok(report)
    }

    /// Writes every station's archive sample and rolling entry
    ///
    /// Stations are written concurrently; a failed write is logged and
    /// counted without affecting the others.
    pub async fn persist(&self, snapshot: &Snapshot) -> CycleReport {
        let outcomes = join_all(
            snapshot
                .entries()
                .iter()
                .map(|entry| self.persist_entry(snapshot, entry)),
        )
        .await;

        let mut report = CycleReport {
            stations: snapshot.len(),
            ..CycleReport::default()
        };
        for (archived, logged) in outcomes {
            match archived {
                Some(Ok(())) => report.archived += 1,
                Some(Err(_)) => report.failed_writes += 1,
                None => {}
            }
            match logged {
                Some(Ok(())) => report.logged += 1,
                Some(Err(_)) => report.failed_writes += 1,
                None => {}
            }
        }
        report
    }

    async fn persist_entry(
        &self,
        snapshot: &Snapshot,
        entry: &SnapshotEntry,
    ) -> (Option<Result<(), StorageError>>, Option<Result<(), StorageError>>) {
        let persist = &self.provider.persist;
        let provider = self.provider.id.as_str();
        let station = entry.station_id.as_str();

        let sample = entry
            .reading
            .is_active()
            .then(|| entry.reading.get(persist.sample_field))
            .flatten();

        let archived = match sample {
            Some(value) if persist.daily_archive => Some(
                self.service
                    .archive()
                    .record(provider, station, snapshot.timestamp(), value)
                    .await,
            ),
            _ => {
                debug!("{}/{}: no sample to archive", provider, station);
                None
            }
        };

        let logged = if persist.rolling_log {
            let rolling_entry = RollingEntry {
                timestamp: snapshot.timestamp(),
                reading: entry.reading.clone(),
            };
            Some(
                self.service
                    .rolling()
                    .append(provider, station, rolling_entry)
                    .await
                    .map(|_| ()),
            )
        } else {
            None
        };

        for result in [&archived, &logged].into_iter().flatten() {
            if let Err(e) = result {
                error!("Provider {}: failed to persist station '{}': {}", provider, station, e);
            }
        }

        (archived, logged)
    }
}
