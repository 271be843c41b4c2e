use platform_sdk::PlatformError;
use tenancy::RepoError;
use tenantdash_security::PathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    /// A configured id does not form a valid document or object path.
    #[error("invalid fixture id: {0}")]
    InvalidId(#[from] PathError),

    #[error("failed to build fixture: {0}")]
    Build(#[from] RepoError),

    #[error("{operation} failed for '{target}': {source}")]
    Platform {
        operation: &'static str,
        target: String,
        #[source]
        source: PlatformError,
    },
}

impl SeedError {
    pub(crate) fn platform(operation: &'static str, target: impl Into<String>, source: PlatformError) -> Self {
        tracing::error!(operation, code = source.code(), error = %source, "platform call failed");
        Self::Platform {
            operation,
            target: target.into(),
            source,
        }
    }
}
