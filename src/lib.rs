//! Weather-station network aggregation
//!
//! Upstream networks are fetched through descriptor-driven adapters,
//! normalized into one reading schema, served as snapshots and persisted
//! into per-station date/hour archives and rolling logs.

pub mod aggregator;
pub mod archive;
pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod readings;
pub mod service;

#[cfg(test)]
pub mod test_utils;

pub use error::{MeteolinkError, Result};
