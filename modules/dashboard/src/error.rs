use platform_sdk::PlatformError;
use tenancy::RepoError;
use thiserror::Error;

use crate::gate::RedirectTarget;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The gate refused the route; the caller should navigate to the target.
    #[error("redirect to {}", .0.path())]
    Redirect(RedirectTarget),

    #[error("sign-in failed: {0}")]
    SignIn(#[source] PlatformError),

    #[error("failed to load dashboard data: {0}")]
    Data(#[from] RepoError),
}
