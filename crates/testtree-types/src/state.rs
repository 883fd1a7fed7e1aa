use std::fmt;

use serde::{Deserialize, Serialize};

/// Liveness of an element across discovery passes.
///
/// An element becomes `Invalid` when the store marks it so between passes.
/// Invalid elements are pruned from their parent's children the next time
/// the parent is touched by the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    #[default]
    Valid,
    Invalid,
}

impl ElementState {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    pub fn is_invalid(self) -> bool {
        self == Self::Invalid
    }
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}
