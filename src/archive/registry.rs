use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Identifies one station's durable document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationKey {
    pub provider: String,
    pub station: String,
}

impl StationKey {
    pub fn new(provider: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            station: station.into(),
        }
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.station)
    }
}

/// Registry of per-station write handles
///
/// Each station gets its own mutex, created on first use and kept for the
/// life of the registry. Holding a station's guard is what makes a
/// read-modify-write of its document exclusive; different stations never
/// contend.
#[derive(Default)]
pub struct StationLocks {
    handles: Mutex<HashMap<StationKey, Arc<Mutex<()>>>>,
}

impl StationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for a station, creating it if needed
    pub async fn handle(&self, key: &StationKey) -> Arc<Mutex<()>> {
        let mut handles = self.handles.lock().await;
        Arc::clone(handles.entry(key.clone()).or_default())
    }

    /// Waits for exclusive access to a station's document
    ///
    /// The guard is owned so it can travel into a blocking task and outlive
    /// a cancelled caller.
    pub async fn acquire(&self, key: &StationKey) -> OwnedMutexGuard<()> {
        self.handle(key).await.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_shares_handle() {
        let locks = StationLocks::new();
        let key = StationKey::new("limet", "Molassana");

        let first = locks.handle(&key).await;
        let second = locks.handle(&key).await;

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_different_stations_do_not_contend() {
        let locks = StationLocks::new();
        let _held = locks.acquire(&StationKey::new("limet", "Molassana")).await;

        let other = locks.handle(&StationKey::new("limet", "Fabbriche")).await;
        assert!(other.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_same_station_is_exclusive() {
        let locks = StationLocks::new();
        let key = StationKey::new("cml", "MIL01");
        let held = locks.acquire(&key).await;

        assert!(locks.handle(&key).await.try_lock().is_err());
        drop(held);
        assert!(locks.handle(&key).await.try_lock().is_ok());
    }
}
