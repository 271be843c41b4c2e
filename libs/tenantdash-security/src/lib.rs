#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! TenantDash security primitives.
//!
//! - [`Role`] and [`UserClaims`] describe what a signed-in identity carries
//! - [`SecurityContext`] is passed to every platform call
//! - [`DocPath`], [`CollectionRef`] and [`BlobPath`] address platform resources
//! - [`RuleEngine`] evaluates the tenant-scoped access rules against a context
//!
//! The rule set is shared by the local platform (which enforces it), the dashboard
//! (which issues the minimal queries it allows) and the rule verification tooling.

pub mod claims;
pub mod context;
pub mod error;
pub mod policy;
pub mod resource;
pub mod role;
pub mod rules;

pub use claims::UserClaims;
pub use context::{Principal, SecurityContext};
pub use error::{AccessError, PathError};
pub use policy::{AccessPolicy, VendorJobVisibility};
pub use resource::{BlobPath, BlobScope, CollectionRef, DocPath, EqFilter, ScopedKind};
pub use role::Role;
pub use rules::{BlobOp, RuleEngine};

/// Document field names the rule set inspects.
pub mod fields {
    pub const COMPANY_ID: &str = "companyId";
    pub const VENDOR_ID: &str = "vendorId";
}
