use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::readings::Snapshot;

/// In-memory snapshot cache, one entry per provider
pub struct SnapshotCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

struct CacheEntry {
    snapshot: Arc<Snapshot>,
    inserted_at: Instant,
}

impl SnapshotCache {
    /// A zero TTL disables reuse
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// The provider's snapshot, if it is younger than the TTL
    pub async fn get(&self, provider: &str) -> Option<Arc<Snapshot>> {
        let entries = self.entries.read().await;
        let entry = entries.get(provider)?;

        let age = entry.inserted_at.elapsed();
        if age < self.ttl {
            debug!("Snapshot cache hit for {} (age: {:?})", provider, age);
            Some(Arc::clone(&entry.snapshot))
        } else {
            debug!("Snapshot cache entry expired for {}", provider);
            None
        }
    }

    /// The provider's last snapshot regardless of age
    pub async fn latest(&self, provider: &str) -> Option<Arc<Snapshot>> {
        self.entries
            .read()
            .await
            .get(provider)
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Stores a snapshot under its provider, replacing the previous one
    pub async fn insert(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let entry = CacheEntry {
            snapshot: Arc::clone(&snapshot),
            inserted_at: Instant::now(),
        };
        self.entries
            .write()
            .await
            .insert(snapshot.provider().to_string(), entry);
        snapshot
    }
}
