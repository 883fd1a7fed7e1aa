use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Fully qualified name of a discovered test type.
///
/// Namespaces are separated by `.`, nested types by `+`
/// (`Sample.Specs.When_adding+And_overflowing`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeName {
    full: String,
}

impl TypeName {
    /// Parse a fully qualified type name.
    pub fn new(full: impl Into<String>) -> Result<Self, TypeError> {
        let full = full.into();
        if full.is_empty() {
            return Err(TypeError::EmptyName { what: "type name" });
        }
        if full.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidTypeName {
                name: full,
                reason: "contains whitespace".into(),
            });
        }
        if full.starts_with(['.', '+']) || full.ends_with(['.', '+']) {
            return Err(TypeError::InvalidTypeName {
                name: full,
                reason: "starts or ends with a separator".into(),
            });
        }
        Ok(Self { full })
    }

    pub fn full_name(&self) -> &str {
        &self.full
    }

    /// The type's own name, without namespace or declaring types.
    pub fn short_name(&self) -> &str {
        match self.full.rfind(['.', '+']) {
            Some(idx) => &self.full[idx + 1..],
            None => &self.full,
        }
    }

    /// The namespace, or `None` for a type in the global namespace.
    pub fn namespace(&self) -> Option<&str> {
        let outermost = match self.full.find('+') {
            Some(idx) => &self.full[..idx],
            None => &self.full,
        };
        outermost.rfind('.').map(|idx| &outermost[..idx])
    }
}

impl FromStr for TypeName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TypeName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.full
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}
