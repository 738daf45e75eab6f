pub mod daily;
pub mod registry;
pub mod retention;
pub mod rolling;
pub mod store;


pub use daily::{DailyArchive, DailyArchiveStore};
pub use registry::{StationKey, StationLocks};
pub use retention::RetentionManager;
pub use rolling::{RollingEntry, RollingLog, RollingLogStore};
pub use store::{JsonDocumentStore, StorageError};
