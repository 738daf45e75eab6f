pub mod adapter;
pub mod descriptor;
pub mod extractor;
pub mod fetcher;
pub mod geo;
pub mod layouts;
pub mod models;


pub use adapter::HttpSourceAdapter;
pub use descriptor::{CoordinateSource, FieldMapping, InactivityRule, Layout, ProviderDescriptor, Sentinel};
pub use extractor::{parse_decimal, JsonExtractor};
pub use models::{AdapterError, FetchScope, RawRecord, SourceAdapter};
