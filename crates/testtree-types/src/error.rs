use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{what} must not be empty")]
    EmptyName { what: &'static str },

    #[error("invalid type name {name:?}: {reason}")]
    InvalidTypeName { name: String, reason: String },

    #[error("invalid member name {name:?}: {reason}")]
    InvalidMemberName { name: String, reason: String },
}
