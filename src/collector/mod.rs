pub mod manager;
pub mod monitor;

#[cfg(test)]
mod tests;

pub use manager::CollectorManager;
pub use monitor::{CycleReport, ProviderMonitor};
