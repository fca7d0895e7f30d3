use reactive_framework::FetchError;
use thiserror::Error;

/// Errors raised while configuring, running or stopping the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid value {value:?} for {key}")]
    Config { key: String, value: String },

    #[error("malformed configuration: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("store request failed: {0}")]
    Store(#[from] FetchError),

    #[error("shutdown failed: {0}")]
    Shutdown(String),
}
