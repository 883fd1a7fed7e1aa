use testtree_types::ElementId;

/// Errors from element store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested element was not found.
    #[error("element not found: {0}")]
    NotFound(ElementId),

    /// A lock guarding the index was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Failure reported by a non-memory backend.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
