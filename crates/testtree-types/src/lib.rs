//! Foundation types for testtree.
//!
//! This crate provides the identity and metadata types shared by the element
//! store and the registry. Every other testtree crate depends on
//! `testtree-types`.
//!
//! # Key Types
//!
//! - [`Scope`] -- Compilation unit plus target platform an element belongs to
//! - [`TypeName`] -- Fully qualified name of a discovered test type
//! - [`ElementId`] -- Scope plus string key; equality defines element uniqueness
//! - [`OwnCategories`] -- Category tags attached directly to an element, by provenance
//! - [`ElementState`] -- Liveness of an element across discovery passes

pub mod category;
pub mod error;
pub mod identity;
pub mod scope;
pub mod state;
pub mod type_name;

pub use category::{Category, CategorySource, OwnCategories};
pub use error::TypeError;
pub use identity::ElementId;
pub use scope::{ProjectId, Scope, TargetFrameworkId};
pub use state::ElementState;
pub use type_name::TypeName;
