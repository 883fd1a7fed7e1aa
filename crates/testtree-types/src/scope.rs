//! Opaque context supplied by the project model: which compilation unit and
//! which target platform an element was discovered for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A compilation unit (project) reference.
///
/// Only its name participates in equality; the registry never looks inside.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::EmptyName { what: "project name" });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A target platform reference (e.g. `net8.0`, `net472`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetFrameworkId(String);

impl TargetFrameworkId {
    pub fn new(moniker: impl Into<String>) -> Result<Self, TypeError> {
        let moniker = moniker.into();
        if moniker.trim().is_empty() {
            return Err(TypeError::EmptyName { what: "target framework" });
        }
        Ok(Self(moniker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetFrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The scope half of an [`ElementId`](crate::ElementId).
///
/// The same type discovered in two projects, or in one project built for two
/// targets, yields two distinct elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    pub project: ProjectId,
    pub target: TargetFrameworkId,
}

impl Scope {
    pub fn new(project: ProjectId, target: TargetFrameworkId) -> Self {
        Self { project, target }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_rejected() {
        let err = ProjectId::new("  ").unwrap_err();
        assert_eq!(err, TypeError::EmptyName { what: "project name" });
    }

    #[test]
    fn empty_target_rejected() {
        assert!(TargetFrameworkId::new("").is_err());
    }

    #[test]
    fn scopes_differ_by_target() {
        let project = ProjectId::new("Sample.Tests").unwrap();
        let a = Scope::new(project.clone(), TargetFrameworkId::new("net8.0").unwrap());
        let b = Scope::new(project, TargetFrameworkId::new("net472").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn scope_display() {
        let scope = Scope::new(
            ProjectId::new("Sample.Tests").unwrap(),
            TargetFrameworkId::new("net8.0").unwrap(),
        );
        assert_eq!(scope.to_string(), "Sample.Tests/net8.0");
    }
}
