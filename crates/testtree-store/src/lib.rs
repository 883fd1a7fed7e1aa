//! Test-tree elements and the store that indexes them.
//!
//! An [`Element`] is the unit of record for one discovered entity: a suite
//! (test type), a grouping (a shared set of cases pulled into a suite), a
//! case inside a grouping, or a case declared directly on a suite. Elements
//! are handed out as [`ElementRef`] (`Arc<Element>`) so callers can hold on
//! to them across discovery passes; mutable fields sit behind interior locks.
//!
//! # Storage Backends
//!
//! The wider-scoped index of elements is an [`ElementStore`]. The registry
//! only looks elements up, lists children and removes invalid ones; adding
//! elements and invalidating them between passes is the consumer's job.
//!
//! - [`InMemoryElementStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Children are never stored on the parent; they are derived from each
//!    element's current parent link.
//! 2. Identity, kind and the stored `ignored` flag are fixed at construction.
//! 3. Removal is by reference: a store never drops a different element that
//!    happens to share the id.

pub mod element;
pub mod error;
pub mod memory;
pub mod traits;

pub use element::{
    Element, ElementDetails, ElementKind, ElementRef, MemberInfo, MemberKind, SuiteInfo,
};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryElementStore;
pub use traits::ElementStore;
