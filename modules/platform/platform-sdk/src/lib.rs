#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Platform SDK
//!
//! Public API of the backing platform used by every TenantDash component:
//!
//! - [`IdentityClient`] - email/password sign-in, ID tokens and custom claims
//! - [`DocumentClient`] - the hierarchical document store
//! - [`BlobClient`] - the path-addressed object store
//! - [`PlatformClient`] - all three behind one handle
//! - [`PlatformError`] - errors with stable wire codes
//!
//! ## Usage
//!
//! ```ignore
//! use platform_sdk::{DocumentClient, IdentityClient, Query};
//!
//! let session = platform.sign_in("vendor@example.com", "vendor123").await?;
//! let ctx = session.security_context();
//! let tasks = platform
//!     .query(&ctx, &Query::new(tasks_ref).where_eq("vendorId", session.uid()))
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::{BlobClient, DocumentClient, IdentityClient, PlatformClient};
pub use error::PlatformError;
pub use models::{
    CustomClaims, Document, IdTokenClaims, NewUser, Query, Session, UserPage, UserRecord,
};
