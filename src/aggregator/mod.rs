pub mod cache;
pub mod snapshot;


pub use cache::SnapshotCache;
pub use snapshot::SnapshotAggregator;
