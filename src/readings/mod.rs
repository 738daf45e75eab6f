pub mod models;
pub mod normalizer;


pub use models::{Field, FieldParseError, GeoPoint, Reading, SensorValues, Snapshot, SnapshotEntry, StationStatus};
pub use normalizer::normalize;
