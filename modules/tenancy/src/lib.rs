#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Tenancy
//!
//! Typed tenant entities (companies, users, vendors, jobs, tasks, shares, files) and
//! [`TenancyRepo`], which reads them with the narrowest scope the caller's claims allow.

pub mod error;
pub mod model;
pub mod repo;

pub use error::RepoError;
pub use model::{
    Company, FileRecord, Job, Record, ScopedEntity, Share, Task, UserProfile, VendorProfile,
    to_fields,
};
pub use repo::TenancyRepo;
