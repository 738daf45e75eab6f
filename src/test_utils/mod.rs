//! Test utilities for the Meteolink codebase
//!
//! Factories for configuration and readings plus a scriptable source
//! adapter, shared by the unit test modules.

pub mod factories;
pub mod mocks;

pub use factories::*;
pub use mocks::*;
