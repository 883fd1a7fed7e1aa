//! Error types for registry operations.

use thiserror::Error;

use testtree_store::{ElementKind, StoreError};
use testtree_types::{ElementId, TypeError};

/// Errors that can occur while resolving or updating elements.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing element store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An id could not be built from the discovered names.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The id is already bound to an element of another kind and the
    /// factory is configured to reject such lookups.
    #[error("element {id} is a {found}, expected a {expected}")]
    KindMismatch {
        id: ElementId,
        expected: ElementKind,
        found: ElementKind,
    },

    /// Category reconciliation was requested for a non-suite element.
    #[error("element {0} is not a suite")]
    NotASuite(ElementId),
}

/// Convenience type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
