//! The element variant model.
//!
//! Every [`Element`] shares one contract (id, parent, own categories, state,
//! ignored) and carries its variant data in the closed [`ElementDetails`]
//! enum, so callers can match exhaustively on what they got back.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use testtree_types::{ElementId, ElementState, OwnCategories, TypeName};

/// Shared handle to an element. Reference equality (`Arc::ptr_eq`) is what
/// "the same node" means to callers holding handles across passes.
pub type ElementRef = Arc<Element>;

/// The four element variants, without their data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Suite,
    Grouping,
    GroupingCase,
    SuiteCase,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suite => write!(f, "suite"),
            Self::Grouping => write!(f, "grouping"),
            Self::GroupingCase => write!(f, "grouping case"),
            Self::SuiteCase => write!(f, "suite case"),
        }
    }
}

/// The three kinds an element created under a parent can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    Grouping,
    GroupingCase,
    SuiteCase,
}

impl From<MemberKind> for ElementKind {
    fn from(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Grouping => Self::Grouping,
            MemberKind::GroupingCase => Self::GroupingCase,
            MemberKind::SuiteCase => Self::SuiteCase,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ElementKind::from(*self).fmt(f)
    }
}

/// Suite-only data. Location, subject and the explicit flag are refreshed on
/// every re-discovery of the suite.
#[derive(Debug)]
pub struct SuiteInfo {
    type_name: TypeName,
    subject: RwLock<Option<String>>,
    assembly_location: RwLock<PathBuf>,
    explicit: AtomicBool,
}

impl SuiteInfo {
    pub fn new(
        type_name: TypeName,
        subject: Option<String>,
        assembly_location: PathBuf,
        explicit: bool,
    ) -> Self {
        Self {
            type_name,
            subject: RwLock::new(subject),
            assembly_location: RwLock::new(assembly_location),
            explicit: AtomicBool::new(explicit),
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn subject(&self) -> Option<String> {
        self.subject.read().clone()
    }

    pub fn set_subject(&self, subject: Option<String>) {
        *self.subject.write() = subject;
    }

    pub fn assembly_location(&self) -> PathBuf {
        self.assembly_location.read().clone()
    }

    pub fn set_assembly_location(&self, location: &Path) {
        *self.assembly_location.write() = location.to_path_buf();
    }

    /// When set, every descendant runs only on direct selection.
    pub fn is_explicit(&self) -> bool {
        self.explicit.load(Ordering::Acquire)
    }

    pub fn set_explicit(&self, explicit: bool) {
        self.explicit.store(explicit, Ordering::Release);
    }
}

/// Data for the three member variants: the owning type and the member name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub owner: TypeName,
    pub member: String,
}

impl MemberInfo {
    pub fn new(owner: TypeName, member: impl Into<String>) -> Self {
        Self {
            owner,
            member: member.into(),
        }
    }
}

/// Variant data of an element.
#[derive(Debug)]
pub enum ElementDetails {
    Suite(SuiteInfo),
    Grouping(MemberInfo),
    GroupingCase(MemberInfo),
    SuiteCase(MemberInfo),
}

impl ElementDetails {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Suite(_) => ElementKind::Suite,
            Self::Grouping(_) => ElementKind::Grouping,
            Self::GroupingCase(_) => ElementKind::GroupingCase,
            Self::SuiteCase(_) => ElementKind::SuiteCase,
        }
    }
}

/// One node of the test tree.
pub struct Element {
    id: ElementId,
    details: ElementDetails,
    ignored: bool,
    parent: RwLock<Option<ElementRef>>,
    categories: RwLock<OwnCategories>,
    state: RwLock<ElementState>,
}

impl Element {
    /// Create a detached, valid element with no categories.
    pub fn new(id: ElementId, details: ElementDetails, ignored: bool) -> ElementRef {
        Arc::new(Self {
            id,
            details,
            ignored,
            parent: RwLock::new(None),
            categories: RwLock::new(OwnCategories::new()),
            state: RwLock::new(ElementState::Valid),
        })
    }

    pub fn suite(id: ElementId, info: SuiteInfo, ignored: bool) -> ElementRef {
        Self::new(id, ElementDetails::Suite(info), ignored)
    }

    /// Create a member element of the given kind.
    pub fn member(kind: MemberKind, id: ElementId, info: MemberInfo, ignored: bool) -> ElementRef {
        let details = match kind {
            MemberKind::Grouping => ElementDetails::Grouping(info),
            MemberKind::GroupingCase => ElementDetails::GroupingCase(info),
            MemberKind::SuiteCase => ElementDetails::SuiteCase(info),
        };
        Self::new(id, details, ignored)
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.details.kind()
    }

    pub fn details(&self) -> &ElementDetails {
        &self.details
    }

    pub fn as_suite(&self) -> Option<&SuiteInfo> {
        match &self.details {
            ElementDetails::Suite(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&MemberInfo> {
        match &self.details {
            ElementDetails::Suite(_) => None,
            ElementDetails::Grouping(info)
            | ElementDetails::GroupingCase(info)
            | ElementDetails::SuiteCase(info) => Some(info),
        }
    }

    pub fn parent(&self) -> Option<ElementRef> {
        self.parent.read().clone()
    }

    pub fn parent_id(&self) -> Option<ElementId> {
        self.parent.read().as_ref().map(|p| p.id.clone())
    }

    pub fn set_parent(&self, parent: Option<ElementRef>) {
        *self.parent.write() = parent;
    }

    pub fn own_categories(&self) -> OwnCategories {
        self.categories.read().clone()
    }

    pub fn set_own_categories(&self, categories: OwnCategories) {
        *self.categories.write() = categories;
    }

    pub fn state(&self) -> ElementState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ElementState) {
        *self.state.write() = state;
    }

    /// The `ignored` flag as stored at construction.
    pub fn ignored(&self) -> bool {
        self.ignored
    }

    /// Whether this element sits under an explicit suite (or is one).
    pub fn is_explicit(&self) -> bool {
        if let Some(info) = self.as_suite() {
            return info.is_explicit();
        }
        let mut seen = HashSet::from([self.id.clone()]);
        let mut current = self.parent();
        while let Some(ancestor) = current {
            if !seen.insert(ancestor.id.clone()) {
                // Reparenting made a loop; nothing above it is a suite.
                return false;
            }
            if let Some(info) = ancestor.as_suite() {
                return info.is_explicit();
            }
            current = ancestor.parent();
        }
        false
    }

    /// `ignored || parent.explicit`, read at call time.
    pub fn effective_ignored(&self) -> bool {
        self.ignored || self.parent().is_some_and(|p| p.is_explicit())
    }

    /// Human-readable label for the presentation layer.
    pub fn display_name(&self) -> String {
        match &self.details {
            ElementDetails::Suite(info) => match info.subject() {
                Some(subject) if !subject.is_empty() => {
                    format!("{subject}, {}", info.type_name().short_name())
                }
                _ => info.type_name().short_name().to_string(),
            },
            ElementDetails::Grouping(info)
            | ElementDetails::GroupingCase(info)
            | ElementDetails::SuiteCase(info) => info.member.replace('_', " "),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("parent", &self.parent_id())
            .field("state", &self.state())
            .field("ignored", &self.ignored)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testtree_types::{CategorySource, ProjectId, Scope, TargetFrameworkId};

    fn scope() -> Scope {
        Scope::new(
            ProjectId::new("Sample.Tests").unwrap(),
            TargetFrameworkId::new("net8.0").unwrap(),
        )
    }

    fn suite(name: &str, subject: Option<&str>, explicit: bool) -> ElementRef {
        let type_name = TypeName::new(name).unwrap();
        let id = ElementId::for_type(scope(), &type_name);
        let info = SuiteInfo::new(
            type_name,
            subject.map(str::to_string),
            PathBuf::from("bin/Sample.Tests.dll"),
            explicit,
        );
        Element::suite(id, info, false)
    }

    fn member(kind: MemberKind, parent: &ElementRef, name: &str, ignored: bool) -> ElementRef {
        let owner = TypeName::new(parent.id().key().split("::").next().unwrap()).unwrap();
        let id = ElementId::for_member(scope(), &owner, name).unwrap();
        let element = Element::member(kind, id, MemberInfo::new(owner, name), ignored);
        element.set_parent(Some(parent.clone()));
        element
    }

    #[test]
    fn new_element_is_valid_and_detached() {
        let s = suite("Sample.When_adding", None, false);
        assert_eq!(s.state(), ElementState::Valid);
        assert!(s.parent().is_none());
        assert!(s.own_categories().is_empty());
        assert_eq!(s.kind(), ElementKind::Suite);
    }

    #[test]
    fn member_kind_matches_built_element() {
        let s = suite("Sample.When_adding", None, false);
        for kind in [MemberKind::Grouping, MemberKind::GroupingCase, MemberKind::SuiteCase] {
            let element = member(kind, &s, "should_add", false);
            assert_eq!(element.kind(), ElementKind::from(kind));
            assert_ne!(element.kind(), ElementKind::Suite);
            assert_eq!(kind.to_string(), element.kind().to_string());
        }
    }

    #[test]
    fn member_kinds_map_to_details() {
        let s = suite("Sample.When_adding", None, false);
        let g = member(MemberKind::Grouping, &s, "behaves_like_calc", false);
        let gc = member(MemberKind::GroupingCase, &g, "should_work", false);
        let sc = member(MemberKind::SuiteCase, &s, "should_add", false);
        assert!(matches!(g.details(), ElementDetails::Grouping(_)));
        assert!(matches!(gc.details(), ElementDetails::GroupingCase(_)));
        assert!(matches!(sc.details(), ElementDetails::SuiteCase(_)));
        assert!(sc.as_suite().is_none());
        assert_eq!(sc.as_member().unwrap().member, "should_add");
    }

    #[test]
    fn explicit_reaches_grandchildren() {
        let s = suite("Sample.When_adding", None, true);
        let g = member(MemberKind::Grouping, &s, "behaves_like_calc", false);
        let gc = member(MemberKind::GroupingCase, &g, "should_work", false);
        assert!(gc.is_explicit());
        assert!(gc.effective_ignored());
        assert!(!gc.ignored());
    }

    #[test]
    fn effective_ignored_follows_parent_at_read_time() {
        let s = suite("Sample.When_adding", None, false);
        let case = member(MemberKind::SuiteCase, &s, "should_add", false);
        assert!(!case.effective_ignored());

        s.as_suite().unwrap().set_explicit(true);
        assert!(case.effective_ignored());
        assert!(!case.ignored());
    }

    #[test]
    fn ignored_case_stays_ignored() {
        let s = suite("Sample.When_adding", None, false);
        let case = member(MemberKind::SuiteCase, &s, "should_add", true);
        assert!(case.effective_ignored());
    }

    #[test]
    fn reparent_loop_does_not_hang() {
        let s = suite("Sample.When_adding", None, false);
        let g = member(MemberKind::Grouping, &s, "behaves_like_calc", false);
        let gc = member(MemberKind::GroupingCase, &g, "should_work", false);
        g.set_parent(Some(gc.clone()));
        assert!(!gc.is_explicit());
        // Break the cycle so the Arcs can drop.
        g.set_parent(None);
    }

    #[test]
    fn display_names() {
        let with_subject = suite("Sample.When_adding", Some("Calculator"), false);
        assert_eq!(with_subject.display_name(), "Calculator, When_adding");

        let without = suite("Sample.When_adding", None, false);
        assert_eq!(without.display_name(), "When_adding");

        let case = member(MemberKind::SuiteCase, &without, "should_add_numbers", false);
        assert_eq!(case.display_name(), "should add numbers");
    }

    #[test]
    fn suite_fields_are_mutable() {
        let s = suite("Sample.When_adding", None, false);
        let info = s.as_suite().unwrap();
        info.set_assembly_location(Path::new("out/Sample.Tests.dll"));
        info.set_subject(Some("Calculator".into()));
        assert_eq!(info.assembly_location(), PathBuf::from("out/Sample.Tests.dll"));
        assert_eq!(info.subject().as_deref(), Some("Calculator"));
    }

    #[test]
    fn categories_are_replaced_wholesale() {
        let s = suite("Sample.When_adding", None, false);
        let cats = OwnCategories::new().with_source(&["slow"], CategorySource::Attribute);
        s.set_own_categories(cats.clone());
        assert_eq!(s.own_categories(), cats);
    }
}
