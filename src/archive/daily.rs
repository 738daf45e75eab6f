use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::registry::StationKey;
use super::store::{JsonDocumentStore, StorageError};
use crate::constants::storage;

/// Samples of one station bucketed by calendar date, then by hour of day
///
/// Serialized as `{"2025-10-08": {"14": [20.1, 20.4]}}`. Buckets appear
/// lazily on first write and only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyArchive {
    days: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

impl DailyArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample to the `[date][hour]` bucket, creating either level
    pub fn append(&mut self, date: &str, hour: &str, sample: f64) {
        self.days
            .entry(date.to_string())
            .or_default()
            .entry(hour.to_string())
            .or_default()
            .push(sample);
    }

    pub fn samples(&self, date: &str, hour: &str) -> Option<&[f64]> {
        self.days
            .get(date)
            .and_then(|hours| hours.get(hour))
            .map(Vec::as_slice)
    }

    pub fn hours(&self, date: &str) -> Option<&BTreeMap<String, Vec<f64>>> {
        self.days.get(date)
    }

    /// Date keys in ascending order
    pub fn dates(&self) -> Vec<String> {
        self.days.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Removes whole dates strictly before `threshold`
    ///
    /// Keys that do not parse as dates are left alone.
    pub fn remove_dates_before(&mut self, threshold: NaiveDate) -> Vec<String> {
        let expired: Vec<String> = self
            .days
            .keys()
            .filter(|key| {
                NaiveDate::parse_from_str(key, storage::DATE_KEY_FORMAT)
                    .map(|date| date < threshold)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        for key in &expired {
            self.days.remove(key);
        }
        expired
    }
}

/// Formats a calendar date as an archive key
pub fn date_key(date: NaiveDate) -> String {
    date.format(storage::DATE_KEY_FORMAT).to_string()
}

/// Formats an hour of day as an archive key ("00" to "23")
pub fn hour_key(hour: u32) -> String {
    format!("{:02}", hour)
}

/// Durable date/hour archives, one file per (provider, station)
pub struct DailyArchiveStore {
    store: JsonDocumentStore,
    tz: Tz,
}

impl DailyArchiveStore {
    /// Archives live under `<data_dir>/daily`; keys are computed in `tz`
    pub fn new(data_dir: &Path, tz: Tz) -> Self {
        Self {
            store: JsonDocumentStore::new(data_dir.join(storage::DAILY_DIR), "daily_archive"),
            tz,
        }
    }

    /// Calendar date and hour of an instant in the archive's zone
    pub fn bucket_for(&self, at: DateTime<Utc>) -> (NaiveDate, u32) {
        let local = at.with_timezone(&self.tz);
        (local.date_naive(), local.hour())
    }

    /// Today's date in the archive's zone
    pub fn today(&self) -> NaiveDate {
        self.bucket_for(Utc::now()).0
    }

    /// Appends a sample to a station's `[date][hour]` bucket
    pub async fn append(
        &self,
        provider: &str,
        station: &str,
        date: NaiveDate,
        hour: u32,
        sample: f64,
    ) -> Result<(), StorageError> {
        if hour > 23 {
            return Err(StorageError::InvalidKey(format!("hour {} out of range", hour)));
        }
        if !sample.is_finite() {
            return Err(StorageError::InvalidKey(format!("non-finite sample {}", sample)));
        }

        let key = StationKey::new(provider, station);
        let (date, hour) = (date_key(date), hour_key(hour));
        debug!("Archiving {} for {} at {} {}h", sample, key, date, hour);

        self.store
            .update(&key, move |archive: &mut DailyArchive| {
                archive.append(&date, &hour, sample)
            })
            .await
    }

    /// Appends a sample captured at `at`, bucketed in the archive's zone
    pub async fn record(
        &self,
        provider: &str,
        station: &str,
        at: DateTime<Utc>,
        sample: f64,
    ) -> Result<(), StorageError> {
        let (date, hour) = self.bucket_for(at);
        self.append(provider, station, date, hour, sample).await
    }

    /// Reads a station's archive; empty when it was never written
    pub async fn load(&self, provider: &str, station: &str) -> Result<DailyArchive, StorageError> {
        self.store.read(&StationKey::new(provider, station)).await
    }

    /// Date keys currently held for a station
    pub async fn date_keys(&self, provider: &str, station: &str) -> Result<Vec<String>, StorageError> {
        Ok(self.load(provider, station).await?.dates())
    }

    /// Deletes a station's dates older than `threshold`, returning how many went
    pub async fn prune_before(
        &self,
        provider: &str,
        station: &str,
        threshold: NaiveDate,
    ) -> Result<usize, StorageError> {
        let key = StationKey::new(provider, station);
        let removed = self
            .store
            .update(&key, move |archive: &mut DailyArchive| {
                archive.remove_dates_before(threshold)
            })
            .await?;
        Ok(removed.len())
    }

    /// Stations with an archive file under a provider
    pub async fn stations(&self, provider: &str) -> Result<Vec<String>, StorageError> {
        self.store.stations(provider).await
    }
}
