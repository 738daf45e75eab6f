pub mod api;
pub mod models;


pub use api::MeteoService;
pub use models::ServiceError;
