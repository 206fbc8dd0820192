use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request to the durable backend failed (network, timeout, bad status)
    #[error("Backend request failed: {0}")]
    Backend(String),

    /// The durable backend answered with an application-level error
    #[error("Backend rejected command: {0}")]
    BackendResponse(String),

    /// Record (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store client could not be constructed
    #[error("Store configuration error: {0}")]
    Configuration(String),
}
