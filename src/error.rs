use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteolinkError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::parser::ConfigError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] crate::providers::AdapterError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::archive::StorageError),

    #[error("Service error: {0}")]
    Service(#[from] crate::service::ServiceError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MeteolinkError>;
