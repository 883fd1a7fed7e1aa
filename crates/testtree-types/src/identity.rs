use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::scope::Scope;
use crate::type_name::TypeName;

/// Separator between the owning type and the member in a child key.
pub const MEMBER_SEPARATOR: &str = "::";

/// Identity of an element in the test tree.
///
/// Combines a [`Scope`] with a string key. For a suite the key is the fully
/// qualified type name; for any child it is `"{owningType}::{member}"`.
/// Two elements are the same element exactly when their ids are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId {
    scope: Scope,
    key: String,
}

impl ElementId {
    /// Identity of a suite: keyed by the type's full name.
    pub fn for_type(scope: Scope, type_name: &TypeName) -> Self {
        Self {
            scope,
            key: type_name.full_name().to_string(),
        }
    }

    /// Identity of a member of `owner` (grouping, grouping case, suite case).
    pub fn for_member(scope: Scope, owner: &TypeName, member: &str) -> Result<Self, TypeError> {
        if member.is_empty() {
            return Err(TypeError::EmptyName { what: "member name" });
        }
        if member.contains(MEMBER_SEPARATOR) || member.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidMemberName {
                name: member.to_string(),
                reason: "contains whitespace or the member separator".into(),
            });
        }
        Ok(Self {
            scope,
            key: format!("{}{MEMBER_SEPARATOR}{member}", owner.full_name()),
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The member part of a child key, or `None` for a suite key.
    pub fn member(&self) -> Option<&str> {
        self.key
            .split_once(MEMBER_SEPARATOR)
            .map(|(_, member)| member)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.key)
    }
}
