#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Rule verification
//!
//! Signs in as each fixture role and probes the platform with the reads, writes and
//! uploads that role must and must not be able to make. A failed check is reported,
//! a failed sign-in aborts the run.

pub mod error;
pub mod plan;
pub mod report;
pub mod runner;

pub use error::RuleCheckError;
pub use plan::{Check, CheckPhase, Probe, RoleBattery, RuleCheckPlan};
pub use report::{CheckOutcome, RoleReport, RuleCheckReport};
pub use runner::{PROBE_BYTES, RuleCheckRunner};
