//! The element registry for testtree.
//!
//! A scanner calls the [`ElementFactory`] once per discovered entity, top
//! down: suite first, then its groupings and cases. The factory derives the
//! element's id, hands back the element already known for that id (from its
//! own cache or from the [`ElementStore`](testtree_store::ElementStore)) or
//! builds a new one, prunes invalid children of whatever it touches, and
//! rebinds the parent link so elements can move between passes.
//!
//! # Locking
//!
//! Two independent locks:
//!
//! - the **structural** lock (reentrant) guards the id-to-element cache and
//!   the whole get-or-create/prune/reparent sequence;
//! - the **category** lock guards suite category reconciliation and the
//!   change notification that follows it.
//!
//! No thread ever holds both. The category section never takes the
//! structural lock, and a suite's structural section is released before its
//! categories are reconciled. Each entry point locks for itself; nothing
//! holds the structural lock across a whole pass.
//!
//! # Modules
//!
//! - [`factory`] -- [`ElementFactory`] and the discovery inputs/outputs
//! - [`observer`] -- [`ElementObserver`], notified on real category changes
//! - [`config`] -- [`FactoryConfig`]
//! - [`error`] -- [`RegistryError`]

pub mod config;
pub mod error;
pub mod factory;
pub mod observer;

pub use config::{FactoryConfig, KindMismatchPolicy};
pub use error::{RegistryError, RegistryResult};
pub use factory::{ElementFactory, SuiteDiscovery, SuiteOutcome};
pub use observer::ElementObserver;
