#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Fixtures
//!
//! [`FixtureSet`] is generated from a [`FixtureConfig`] and written by [`Seeder`].
//! The rule verification tooling derives its expectations from the same set.

pub mod config;
pub mod error;
pub mod seeder;
pub mod set;
pub mod wipe;

pub use config::{FixtureConfig, RoleUids};
pub use error::SeedError;
pub use seeder::{SeedReport, Seeder};
pub use set::{FixtureBlob, FixtureDoc, FixtureSet, FixtureUser, ids};
pub use wipe::{USER_PAGE_SIZE, nuke_blobs, nuke_documents, nuke_users};
