#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Local platform
//!
//! In-process implementation of the [`platform_sdk`] client traits:
//!
//! - email/password identities with salted digests and custom claims
//! - HS256 ID tokens carrying `role` and `companyId`
//! - a nested document store and a path-addressed blob store, both guarded by the
//!   tenant access rules from [`tenantdash_security`]
//! - optional JSON snapshot so separate processes observe the same state

pub mod config;
mod password;
mod platform;
mod state;
mod token;

pub use config::LocalPlatformConfig;
pub use platform::{LocalPlatform, MAX_PAGE_SIZE};
