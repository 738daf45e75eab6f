use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::registry::StationKey;
use super::store::{JsonDocumentStore, StorageError};
use crate::constants::storage;
use crate::readings::Reading;

/// A reading stamped with its own capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingEntry {
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub reading: Reading,
}

/// Most recent entries of one station, oldest first
///
/// Serialized as `{"station": "<id>", "data": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingLog {
    #[serde(default)]
    pub station: String,

    #[serde(default)]
    pub data: VecDeque<RollingEntry>,
}

impl RollingLog {
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            data: VecDeque::new(),
        }
    }

    /// Appends at the tail, evicting from the head beyond `capacity`
    pub fn push(&mut self, entry: RollingEntry, capacity: usize) {
        self.data.push_back(entry);
        while self.data.len() > capacity {
            self.data.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn latest(&self) -> Option<&RollingEntry> {
        self.data.back()
    }
}

/// Durable fixed-capacity logs, one file per (provider, station)
pub struct RollingLogStore {
    store: JsonDocumentStore,
    capacity: usize,
}

impl RollingLogStore {
    /// Logs live under `<data_dir>/rolling`
    pub fn new(data_dir: &Path, capacity: usize) -> Self {
        Self {
            store: JsonDocumentStore::new(data_dir.join(storage::ROLLING_DIR), "rolling_log"),
            capacity: capacity.max(1),
        }
    }

    /// Appends an entry, returning the log length afterwards
    pub async fn append(
        &self,
        provider: &str,
        station: &str,
        entry: RollingEntry,
    ) -> Result<usize, StorageError> {
        let capacity = self.capacity;
        let station_id = station.to_string();

        self.store
            .update(&StationKey::new(provider, station), move |log: &mut RollingLog| {
                log.station = station_id;
                log.push(entry, capacity);
                log.len()
            })
            .await
    }

    /// Reads a station's log; empty when it was never written
    pub async fn load(&self, provider: &str, station: &str) -> Result<RollingLog, StorageError> {
        let mut log: RollingLog = self.store.read(&StationKey::new(provider, station)).await?;
        if log.station.is_empty() {
            log.station = station.to_string();
        }
        Ok(log)
    }
}
