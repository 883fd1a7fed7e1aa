//! Category tags and their provenance.
//!
//! A suite's own categories are merged per [`CategorySource`]: discovering
//! tags from one source replaces what that source contributed before and
//! leaves the other sources untouched. Change detection is plain value
//! equality on [`OwnCategories`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single category tag (e.g. `slow`, `integration`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Build a category from a raw tag. Blank tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        (!tag.is_empty()).then(|| Self(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a category came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    /// Declared by an attribute on the test type.
    Attribute,
    /// Inferred from naming or project conventions.
    Convention,
}

impl fmt::Display for CategorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute => write!(f, "attribute"),
            Self::Convention => write!(f, "convention"),
        }
    }
}

/// Categories attached directly to an element, grouped by provenance.
///
/// Sources with no tags are not stored, so an empty contribution and an
/// absent one compare equal. `==` compares provenance as well; use
/// [`OwnCategories::same_names`] to ask whether the visible set differs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnCategories {
    by_source: BTreeMap<CategorySource, BTreeSet<Category>>,
}

impl OwnCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy where `source`'s contribution is replaced by `tags`.
    ///
    /// Blank and duplicate tags are dropped. Other sources are kept as-is.
    pub fn with_source<S: AsRef<str>>(&self, tags: &[S], source: CategorySource) -> Self {
        let mut merged = self.clone();
        let set: BTreeSet<Category> = tags
            .iter()
            .filter_map(|tag| Category::parse(tag.as_ref()))
            .collect();
        if set.is_empty() {
            merged.by_source.remove(&source);
        } else {
            merged.by_source.insert(source, set);
        }
        merged
    }

    /// Tags contributed by one source.
    pub fn from_source(&self, source: CategorySource) -> impl Iterator<Item = &Category> {
        self.by_source.get(&source).into_iter().flatten()
    }

    /// All distinct categories, regardless of source.
    pub fn names(&self) -> BTreeSet<&Category> {
        self.by_source.values().flatten().collect()
    }

    /// Whether both carry the same distinct categories, whatever their
    /// sources.
    pub fn same_names(&self, other: &Self) -> bool {
        self.names() == other.names()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_source
            .values()
            .any(|set| set.iter().any(|c| c.as_str() == tag))
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

impl fmt::Display for OwnCategories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().into_iter().map(Category::as_str).collect();
        write!(f, "{}", names.join(", "))
    }
}
