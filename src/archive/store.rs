use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use super::registry::{StationKey, StationLocks};
use crate::metrics::StorageMetrics;

/// Errors raised by the durable document stores
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt document at {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to list {path:?}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Whole-document JSON files, one per (provider, station)
///
/// Reads never see a partial document: writes go to a temporary file in
/// the target directory and are renamed over the old one. Updates of the
/// same station are serialized through a [`StationLocks`] registry.
pub struct JsonDocumentStore {
    root: PathBuf,
    label: &'static str,
    locks: StationLocks,
}

impl JsonDocumentStore {
    pub fn new(root: impl Into<PathBuf>, label: &'static str) -> Self {
        Self {
            root: root.into(),
            label,
            locks: StationLocks::new(),
        }
    }

    /// `<root>/<provider>/<station>.json`
    pub fn path_for(&self, key: &StationKey) -> Result<PathBuf, StorageError> {
        let provider = file_component(&key.provider)?;
        let station = file_component(&key.station)?;
        Ok(self.root.join(provider).join(format!("{}.json", station)))
    }

    /// Reads a document; missing yields the default, corrupt is logged and yields the default
    pub async fn read<T>(&self, key: &StationKey) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        let path = self.path_for(key)?;
        let label = self.label;

        tokio::task::spawn_blocking(move || recover_corrupt(load_document(&path), label))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }

    /// Read-modify-write of one station's document
    ///
    /// The station's guard moves into the blocking task, so a caller that is
    /// cancelled mid-update neither truncates the file nor lets a second
    /// writer in before the rename lands.
    pub async fn update<T, F, R>(&self, key: &StationKey, mutate: F) -> Result<R, StorageError>
    where
        T: Serialize + DeserializeOwned + Default + Send + 'static,
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let path = self.path_for(key)?;
        let label = self.label;
        let guard = self.locks.acquire(key).await;

        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let mut document: T = recover_corrupt(load_document(&path), label)?;
            let outcome = mutate(&mut document);
            write_document(&path, &document)?;
            Ok(outcome)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?;

        StorageMetrics::record_write(self.label, result.is_ok());
        if let Err(e) = &result {
            warn!("{} write for {} failed: {}", self.label, key, e);
        }
        result
    }

    /// Station ids with a document under a provider, sorted
    pub async fn stations(&self, provider: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.root.join(file_component(provider)?);

        tokio::task::spawn_blocking(move || list_documents(&dir))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

/// Keys map one-to-one onto file names, so anything that is not a plain name is refused
fn file_component(raw: &str) -> Result<&str, StorageError> {
    if raw.is_empty()
        || raw == "."
        || raw == ".."
        || raw.contains(|c| matches!(c, '/' | '\\' | '\0'))
    {
        return Err(StorageError::InvalidKey(raw.to_string()));
    }
    Ok(raw)
}

fn load_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No document at {:?} yet", path);
            return Ok(T::default());
        }
        Err(e) => {
            return Err(StorageError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Unreadable documents restart from empty; the old content is discarded
fn recover_corrupt<T: Default>(
    loaded: Result<T, StorageError>,
    label: &'static str,
) -> Result<T, StorageError> {
    match loaded {
        Err(StorageError::Corrupt { path, reason }) => {
            warn!(
                "Discarding unreadable {} document {:?} and starting empty: {}",
                label, path, reason
            );
            StorageMetrics::record_corrupt_recovery(label);
            Ok(T::default())
        }
        other => other,
    }
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    let write_error = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .ok_or_else(|| write_error(io::Error::new(io::ErrorKind::InvalidInput, "no parent directory")))?;
    fs::create_dir_all(dir).map_err(write_error)?;

    let bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(&bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}

fn list_documents(dir: &Path) -> Result<Vec<String>, StorageError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::List {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut stations: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    stations.sort();
    Ok(stations)
}
