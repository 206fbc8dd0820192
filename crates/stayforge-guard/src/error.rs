use stayforge_store::StoreError;
use thiserror::Error;

/// Result type for guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Errors surfaced by the protection policies.
///
/// Backend outages never appear here; the fallback store absorbs them.
/// What remains is record-shape corruption and memory-side failures, which
/// indicate a bug rather than an operational condition.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
