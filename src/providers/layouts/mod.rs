//! Layout strategies splitting a provider payload into per-station bodies

pub mod record_list;
pub mod script_arrays;
pub mod sensor_tables;
pub mod station_document;

pub use script_arrays::ScriptArrays;
