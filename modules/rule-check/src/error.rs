use platform_sdk::PlatformError;
use tenantdash_security::PathError;
use thiserror::Error;

/// Failures that abort a verification run.
///
/// Individual check failures are not errors; they are recorded in the report.
#[derive(Debug, Error)]
pub enum RuleCheckError {
    #[error("sign-in failed for {email}: {source}")]
    SignIn {
        email: String,
        #[source]
        source: PlatformError,
    },

    #[error("no seeded document at {0}")]
    MissingFixture(String),

    #[error("invalid check path: {0}")]
    InvalidPath(#[from] PathError),
}
