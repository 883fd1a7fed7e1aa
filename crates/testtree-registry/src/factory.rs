//! The identity-keyed get-or-create engine.
//!
//! Every entry point funnels into one sequence, run under the structural
//! lock:
//!
//! 1. resolve the id in the local cache, then in the store, else build;
//! 2. remove the element's `Invalid` children from the store;
//! 3. rebind the parent link (last pass wins);
//! 4. rebind own categories (non-suites inherit the parent's own set);
//! 5. cache the element under its id.
//!
//! Suites additionally reconcile their categories afterwards, under the
//! separate category lock. The two locks are never held at once: the
//! structural guard is dropped before the category lock is taken, and the
//! category section never touches the cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, warn};

use testtree_store::{
    Element, ElementKind, ElementRef, ElementStore, MemberInfo, MemberKind, SuiteInfo,
};
use testtree_types::{
    CategorySource, ElementId, OwnCategories, ProjectId, Scope, TargetFrameworkId, TypeName,
};

use crate::config::{FactoryConfig, KindMismatchPolicy};
use crate::error::{RegistryError, RegistryResult};
use crate::observer::ElementObserver;

type ElementCache = RefCell<HashMap<ElementId, ElementRef>>;

/// Everything the scanner found out about one suite.
#[derive(Clone, Debug)]
pub struct SuiteDiscovery {
    pub type_name: TypeName,
    pub assembly_location: PathBuf,
    pub subject: Option<String>,
    pub tags: Vec<String>,
    pub category_source: CategorySource,
    pub ignored: bool,
    pub explicit: bool,
}

impl SuiteDiscovery {
    /// A plain suite: no subject, no tags, not ignored, not explicit.
    pub fn new(type_name: TypeName, assembly_location: impl Into<PathBuf>) -> Self {
        Self {
            type_name,
            assembly_location: assembly_location.into(),
            subject: None,
            tags: Vec::new(),
            category_source: CategorySource::Attribute,
            ignored: false,
            explicit: false,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_tags<S: Into<String>>(
        mut self,
        tags: impl IntoIterator<Item = S>,
        source: CategorySource,
    ) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.category_source = source;
        self
    }

    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn explicit(mut self, explicit: bool) -> Self {
        self.explicit = explicit;
        self
    }
}

/// Result of resolving a suite.
#[derive(Clone, Debug)]
pub struct SuiteOutcome {
    pub element: ElementRef,
    /// `true` only when this call changed the suite's own categories.
    pub categories_changed: bool,
}

/// Registry of test-tree elements for one target framework.
///
/// Hands out the same [`ElementRef`] for the same id across discovery
/// passes, and is safe to share between threads running passes
/// concurrently. Each entry point synchronizes on its own; a pass is just a
/// sequence of calls.
pub struct ElementFactory {
    store: Arc<dyn ElementStore>,
    target: TargetFrameworkId,
    config: FactoryConfig,
    elements: ReentrantMutex<ElementCache>,
    category_lock: Mutex<()>,
    observer: Option<Arc<dyn ElementObserver>>,
}

impl ElementFactory {
    /// Create a factory backed by `store` for elements built for `target`.
    pub fn new(store: Arc<dyn ElementStore>, target: TargetFrameworkId, config: FactoryConfig) -> Self {
        Self {
            store,
            target,
            config,
            elements: ReentrantMutex::new(RefCell::new(HashMap::new())),
            category_lock: Mutex::new(()),
            observer: None,
        }
    }

    /// Attach the subscriber notified when a suite's categories change.
    pub fn with_observer(mut self, observer: Arc<dyn ElementObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn target(&self) -> &TargetFrameworkId {
        &self.target
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// The scope elements of `project` get in this factory.
    pub fn scope(&self, project: &ProjectId) -> Scope {
        Scope::new(project.clone(), self.target.clone())
    }

    /// Element cached by this factory under `id`, without consulting the
    /// store.
    pub fn get(&self, id: &ElementId) -> Option<ElementRef> {
        let elements = self.elements.lock();
        let cached = elements.borrow().get(id).cloned();
        cached
    }

    /// Number of elements this factory has resolved.
    pub fn len(&self) -> usize {
        let elements = self.elements.lock();
        let len = elements.borrow().len();
        len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------

    /// Resolve the suite for a discovered test type.
    ///
    /// Refreshes the assembly location, subject and explicit flag, then
    /// reconciles categories under the category lock once the structural
    /// section is over. The structural section re-enters the lock taken by
    /// the shared get-or-create sequence.
    pub fn get_or_create_suite(
        &self,
        project: &ProjectId,
        discovery: &SuiteDiscovery,
    ) -> RegistryResult<SuiteOutcome> {
        let id = ElementId::for_type(self.scope(project), &discovery.type_name);

        let element = {
            let _elements = self.elements.lock();
            let element = self.get_or_create_element(id, ElementKind::Suite, None, None, |id| {
                let info = SuiteInfo::new(
                    discovery.type_name.clone(),
                    discovery.subject.clone(),
                    discovery.assembly_location.clone(),
                    discovery.explicit,
                );
                Element::suite(id, info, discovery.ignored)
            })?;
            if let Some(info) = element.as_suite() {
                info.set_assembly_location(&discovery.assembly_location);
                info.set_subject(discovery.subject.clone());
                info.set_explicit(discovery.explicit);
            }
            element
        };

        let categories_changed =
            self.update_categories(&element, &discovery.tags, discovery.category_source)?;

        Ok(SuiteOutcome {
            element,
            categories_changed,
        })
    }

    /// Resolve a grouping: a shared set of cases pulled into `parent`.
    pub fn get_or_create_grouping(
        &self,
        project: &ProjectId,
        parent: &ElementRef,
        owner: &TypeName,
        member: &str,
        ignored: bool,
    ) -> RegistryResult<ElementRef> {
        self.get_or_create_member(MemberKind::Grouping, project, parent, owner, member, ignored)
    }

    /// Resolve a case that belongs to a grouping.
    pub fn get_or_create_grouping_case(
        &self,
        project: &ProjectId,
        parent: &ElementRef,
        owner: &TypeName,
        member: &str,
        ignored: bool,
    ) -> RegistryResult<ElementRef> {
        self.get_or_create_member(MemberKind::GroupingCase, project, parent, owner, member, ignored)
    }

    /// Resolve a case declared directly on a suite.
    pub fn get_or_create_suite_case(
        &self,
        project: &ProjectId,
        parent: &ElementRef,
        owner: &TypeName,
        member: &str,
        ignored: bool,
    ) -> RegistryResult<ElementRef> {
        self.get_or_create_member(MemberKind::SuiteCase, project, parent, owner, member, ignored)
    }

    /// Merge `tags` from `source` into a suite's own categories.
    ///
    /// Returns `true` and notifies the observer only if the resulting set of
    /// names differs from the current one. A tag that only moves between
    /// sources is recorded without a notification.
    pub fn update_categories<S: AsRef<str>>(
        &self,
        element: &ElementRef,
        tags: &[S],
        source: CategorySource,
    ) -> RegistryResult<bool> {
        if element.as_suite().is_none() {
            return Err(RegistryError::NotASuite(element.id().clone()));
        }

        let _categories = self.category_lock.lock();
        let current = element.own_categories();
        let updated = current.with_source(tags, source);
        if updated == current {
            return Ok(false);
        }

        let names_changed = !updated.same_names(&current);
        if names_changed {
            debug!(id = %element.id(), %source, categories = %updated, "categories changed");
        }
        element.set_own_categories(updated);
        if !names_changed {
            return Ok(false);
        }

        if let Some(observer) = &self.observer {
            observer.element_changed(element);
        }
        Ok(true)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn get_or_create_member(
        &self,
        kind: MemberKind,
        project: &ProjectId,
        parent: &ElementRef,
        owner: &TypeName,
        member: &str,
        ignored: bool,
    ) -> RegistryResult<ElementRef> {
        let id = ElementId::for_member(self.scope(project), owner, member)?;
        let ignored = ignored || parent.is_explicit();
        let categories = parent.own_categories();

        self.get_or_create_element(id, kind.into(), Some(parent), Some(categories), |id| {
            Element::member(kind, id, MemberInfo::new(owner.clone(), member), ignored)
        })
    }

    fn get_or_create_element(
        &self,
        id: ElementId,
        kind: ElementKind,
        parent: Option<&ElementRef>,
        categories: Option<OwnCategories>,
        build: impl FnOnce(ElementId) -> ElementRef,
    ) -> RegistryResult<ElementRef> {
        let elements = self.elements.lock();

        let element = match self.resolve(&elements, &id, kind)? {
            Some(existing) => {
                debug!(%id, %kind, "reusing element");
                existing
            }
            None => {
                debug!(%id, %kind, "creating element");
                build(id.clone())
            }
        };

        if self.config.prune_invalid_children {
            self.prune_invalid_children(&element)?;
        }

        element.set_parent(parent.cloned());
        if let Some(categories) = categories {
            element.set_own_categories(categories);
        }

        elements.borrow_mut().insert(id, element.clone());
        Ok(element)
    }

    /// Cache first, then store. A hit of the wrong kind is handled per
    /// [`KindMismatchPolicy`].
    fn resolve(
        &self,
        elements: &ElementCache,
        id: &ElementId,
        kind: ElementKind,
    ) -> RegistryResult<Option<ElementRef>> {
        let cached = elements.borrow().get(id).cloned();
        let found = match cached {
            Some(element) => Some(element),
            None => self.store.get_by_id(id)?,
        };

        match found {
            Some(element) if element.kind() == kind => Ok(Some(element)),
            Some(element) => match self.config.on_kind_mismatch {
                KindMismatchPolicy::Rebuild => {
                    warn!(%id, expected = %kind, found = %element.kind(), "id bound to another kind, rebuilding");
                    Ok(None)
                }
                KindMismatchPolicy::Reject => Err(RegistryError::KindMismatch {
                    id: id.clone(),
                    expected: kind,
                    found: element.kind(),
                }),
            },
            None => Ok(None),
        }
    }

    fn prune_invalid_children(&self, element: &ElementRef) -> RegistryResult<()> {
        let invalid: Vec<ElementRef> = self
            .store
            .children_of(element.id())?
            .into_iter()
            .filter(|child| child.state().is_invalid())
            .collect();
        if invalid.is_empty() {
            return Ok(());
        }

        let removed = self.store.remove_elements(&invalid)?;
        debug!(parent = %element.id(), removed, "pruned invalid children");
        Ok(())
    }
}

impl std::fmt::Debug for ElementFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementFactory")
            .field("target", &self.target)
            .field("config", &self.config)
            .field("elements", &self.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
