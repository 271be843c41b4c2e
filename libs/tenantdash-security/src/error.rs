//! Error types for the security library.

use thiserror::Error;

/// Outcome of a rule evaluation that did not grant access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No identity was presented.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The identity is known but the rule set does not grant the operation.
    #[error("access denied: {reason}")]
    Denied { reason: String },
}

impl AccessError {
    pub(crate) fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }
}

/// A resource path that does not match the canonical layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("invalid path segment in '{path}'")]
    InvalidSegment { path: String },

    #[error("unknown collection '{collection}' in '{path}'")]
    UnknownCollection { path: String, collection: String },

    #[error("path '{path}' does not address a {expected}")]
    WrongShape { path: String, expected: &'static str },
}
