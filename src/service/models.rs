use thiserror::Error;

use crate::archive::StorageError;
use crate::providers::AdapterError;

/// Errors returned to callers of the outbound API
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("Unknown station '{station}' for provider '{provider}'")]
    UnknownStation { provider: String, station: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Configuration error: {0}")]
    Config(String),
}
