//! Error types for the platform clients.

use tenantdash_security::{AccessError, PathError};
use thiserror::Error;

/// Errors surfaced by identity, document and blob clients.
///
/// Every variant maps to a stable wire code via [`PlatformError::code`]; tooling
/// reports those codes unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The rule set rejected a document operation.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// The rule set rejected a blob operation.
    #[error("not authorized to access '{path}': {reason}")]
    StorageUnauthorized { path: String, reason: String },

    /// No identity was presented for a client-side call.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("document not found: {path}")]
    NotFound { path: String },

    #[error("object not found: {path}")]
    ObjectNotFound { path: String },

    #[error("user with uid '{uid}' already exists")]
    UidAlreadyExists { uid: String },

    #[error("user with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("invalid email or password")]
    InvalidCredential,

    #[error("user not found: {uid}")]
    UserNotFound { uid: String },

    #[error("invalid id token: {reason}")]
    InvalidIdToken { reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            PlatformError::PermissionDenied { .. } => "permission-denied",
            PlatformError::StorageUnauthorized { .. } => "storage/unauthorized",
            PlatformError::Unauthenticated => "unauthenticated",
            PlatformError::NotFound { .. } => "not-found",
            PlatformError::ObjectNotFound { .. } => "storage/object-not-found",
            PlatformError::UidAlreadyExists { .. } => "auth/uid-already-exists",
            PlatformError::EmailAlreadyExists { .. } => "auth/email-already-exists",
            PlatformError::InvalidCredential => "auth/invalid-credential",
            PlatformError::UserNotFound { .. } => "auth/user-not-found",
            PlatformError::InvalidIdToken { .. } => "auth/invalid-id-token",
            PlatformError::InvalidArgument(_) => "invalid-argument",
            PlatformError::Internal(_) => "internal",
        }
    }

    /// Rejected by the rule set, for documents or blobs.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            PlatformError::PermissionDenied { .. } | PlatformError::StorageUnauthorized { .. }
        )
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            PlatformError::UidAlreadyExists { .. } | PlatformError::EmailAlreadyExists { .. }
        )
    }

    /// Translate a rule denial on a document operation.
    #[must_use]
    pub fn from_document_access(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => PlatformError::Unauthenticated,
            AccessError::Denied { reason } => PlatformError::PermissionDenied { reason },
        }
    }

    /// Translate a rule denial on a blob operation.
    #[must_use]
    pub fn from_blob_access(err: AccessError, path: &str) -> Self {
        match err {
            AccessError::Unauthenticated => PlatformError::Unauthenticated,
            AccessError::Denied { reason } => PlatformError::StorageUnauthorized {
                path: path.to_owned(),
                reason,
            },
        }
    }
}

impl From<PathError> for PlatformError {
    fn from(err: PathError) -> Self {
        PlatformError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            PlatformError::PermissionDenied {
                reason: "x".to_owned()
            }
            .code(),
            "permission-denied"
        );
        assert_eq!(
            PlatformError::UidAlreadyExists {
                uid: "u".to_owned()
            }
            .code(),
            "auth/uid-already-exists"
        );
        assert_eq!(
            PlatformError::ObjectNotFound {
                path: "p".to_owned()
            }
            .code(),
            "storage/object-not-found"
        );
    }

    #[test]
    fn storage_denials_count_as_permission_denied() {
        let err = PlatformError::from_blob_access(
            AccessError::Denied {
                reason: "nope".to_owned(),
            },
            "companies/x/files/a",
        );
        assert_eq!(err.code(), "storage/unauthorized");
        assert!(err.is_permission_denied());
        assert!(!PlatformError::InvalidCredential.is_permission_denied());
    }
}
