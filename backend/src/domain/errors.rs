use thiserror::Error;

/// Error taxonomy of the adherence store.
///
/// `Validation`, `NotFound`, and `Conflict` are recoverable and meant to be
/// surfaced to the caller; `Backend` means the persistence layer failed and
/// the operation committed nothing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing required input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Reference to a nonexistent elder or medication.
    #[error("not found: {0}")]
    NotFound(String),

    /// Access-code collisions exhausted the bounded regenerate loop.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer unreachable or corrupt.
    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Backend(err)
    }
}
