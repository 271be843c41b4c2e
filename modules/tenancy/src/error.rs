use platform_sdk::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The caller's claims carry no `companyId` but the operation is company-scoped.
    #[error("caller has no company claim")]
    MissingCompany,

    #[error("failed to encode entity: {0}")]
    Encode(String),
}

impl RepoError {
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, RepoError::Platform(e) if e.is_permission_denied())
    }

    /// Wire code of the underlying platform error, if any.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RepoError::Platform(e) => Some(e.code()),
            RepoError::MissingCompany | RepoError::Encode(_) => None,
        }
    }
}
