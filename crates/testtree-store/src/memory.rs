//! In-memory element store for testing and embedding.
//!
//! [`InMemoryElementStore`] keeps every element in a `HashMap` protected by a
//! `RwLock`. Children are found by scanning parent links, so a reparented
//! element shows up under its new parent immediately.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use testtree_types::{ElementId, ElementState};

use crate::element::ElementRef;
use crate::error::{StoreError, StoreResult};
use crate::traits::ElementStore;

/// An in-memory implementation of [`ElementStore`].
///
/// All data lives in a `HashMap` behind a `RwLock`. Data is lost when the
/// store is dropped.
pub struct InMemoryElementStore {
    elements: RwLock<HashMap<ElementId, ElementRef>>,
}

impl InMemoryElementStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            elements: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> StoreResult<usize> {
        let map = self.elements.read().map_err(poisoned)?;
        Ok(map.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All stored ids, sorted.
    pub fn all_ids(&self) -> StoreResult<Vec<ElementId>> {
        let map = self.elements.read().map_err(poisoned)?;
        let mut ids: Vec<ElementId> = map.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Stored elements without a parent, sorted by id.
    pub fn roots(&self) -> StoreResult<Vec<ElementRef>> {
        let map = self.elements.read().map_err(poisoned)?;
        let mut roots: Vec<ElementRef> = map
            .values()
            .filter(|element| element.parent().is_none())
            .cloned()
            .collect();
        roots.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(roots)
    }

    /// Mark every stored element `Invalid`, as happens before a full rescan.
    ///
    /// Returns the number of elements touched.
    pub fn invalidate_all(&self) -> StoreResult<usize> {
        let map = self.elements.read().map_err(poisoned)?;
        for element in map.values() {
            element.set_state(ElementState::Invalid);
        }
        debug!(count = map.len(), "invalidated all elements");
        Ok(map.len())
    }
}

impl Default for InMemoryElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore for InMemoryElementStore {
    fn get_by_id(&self, id: &ElementId) -> StoreResult<Option<ElementRef>> {
        let map = self.elements.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn children_of(&self, parent: &ElementId) -> StoreResult<Vec<ElementRef>> {
        let map = self.elements.read().map_err(poisoned)?;
        let mut children: Vec<ElementRef> = map
            .values()
            .filter(|element| element.parent_id().as_ref() == Some(parent))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(children)
    }

    fn remove_elements(&self, elements: &[ElementRef]) -> StoreResult<usize> {
        if elements.is_empty() {
            return Ok(0);
        }
        let mut map = self.elements.write().map_err(poisoned)?;
        let mut removed = 0;
        for element in elements {
            let same = map
                .get(element.id())
                .is_some_and(|stored| Arc::ptr_eq(stored, element));
            if same {
                map.remove(element.id());
                removed += 1;
            }
        }
        debug!(requested = elements.len(), removed, "removed elements");
        Ok(removed)
    }

    fn insert(&self, element: ElementRef) -> StoreResult<Option<ElementRef>> {
        let mut map = self.elements.write().map_err(poisoned)?;
        Ok(map.insert(element.id().clone(), element))
    }

    fn contains(&self, id: &ElementId) -> StoreResult<bool> {
        let map = self.elements.read().map_err(poisoned)?;
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryElementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryElementStore")
            .field("element_count", &count)
            .finish()
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StoreError {
    StoreError::LockPoisoned(err.to_string())
}
