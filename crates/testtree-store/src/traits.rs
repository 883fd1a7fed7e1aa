use testtree_types::{ElementId, ElementState};

use crate::element::ElementRef;
use crate::error::StoreResult;

/// The wider-scoped element index that outlives a single registry.
///
/// It may already hold an element for an id from an earlier session. The
/// registry consults it through [`get_by_id`](Self::get_by_id) and
/// [`children_of`](Self::children_of) and mutates it only through
/// [`remove_elements`](Self::remove_elements), and only for elements that
/// are `Invalid`. Everything else (inserting what the registry returns,
/// invalidating between passes, collecting garbage) belongs to the
/// consumer.
///
/// Implementations must be thread-safe (`Send + Sync`): discovery passes
/// run concurrently.
pub trait ElementStore: Send + Sync {
    /// Look an element up by id.
    ///
    /// Returns `Ok(None)` if no element is stored under the id.
    fn get_by_id(&self, id: &ElementId) -> StoreResult<Option<ElementRef>>;

    /// Every stored element whose current parent has the given id.
    fn children_of(&self, parent: &ElementId) -> StoreResult<Vec<ElementRef>>;

    /// Remove the given elements and return how many were actually removed.
    ///
    /// An entry is only removed if it is the very element passed in
    /// (reference equality), not merely one with the same id.
    fn remove_elements(&self, elements: &[ElementRef]) -> StoreResult<usize>;

    /// Store an element, returning the one previously stored under its id.
    fn insert(&self, element: ElementRef) -> StoreResult<Option<ElementRef>>;

    /// Check whether an element is stored under the id.
    fn contains(&self, id: &ElementId) -> StoreResult<bool> {
        Ok(self.get_by_id(id)?.is_some())
    }

    /// Mark a stored element `Invalid`. Returns `false` if it is not stored.
    fn invalidate(&self, id: &ElementId) -> StoreResult<bool> {
        match self.get_by_id(id)? {
            Some(element) => {
                element.set_state(ElementState::Invalid);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
