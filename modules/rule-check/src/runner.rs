use std::sync::Arc;

use platform_sdk::{PlatformClient, PlatformError};
use serde_json::{Map, Value};
use tenantdash_security::{BlobPath, SecurityContext};

use crate::error::RuleCheckError;
use crate::plan::{Check, CheckPhase, Probe, RoleBattery, RuleCheckPlan, stable_fields};
use crate::report::{CheckOutcome, RoleReport, RuleCheckReport};

/// Payload used for the storage round trip.
pub const PROBE_BYTES: &[u8] = b"hello world";

/// Runs a [`RuleCheckPlan`] against a platform, signed in as each role in turn.
///
/// Only a failed sign-in aborts the run. Every other outcome is recorded.
pub struct RuleCheckRunner<P: PlatformClient + ?Sized> {
    platform: Arc<P>,
}

impl<P: PlatformClient + ?Sized> RuleCheckRunner<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self { platform }
    }

    pub async fn run(&self, plan: &RuleCheckPlan) -> Result<RuleCheckReport, RuleCheckError> {
        let mut report = RuleCheckReport::default();
        for battery in &plan.batteries {
            report.roles.push(self.run_role(battery).await?);
        }
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            "rule check finished"
        );
        Ok(report)
    }

    async fn run_role(&self, battery: &RoleBattery) -> Result<RoleReport, RuleCheckError> {
        let session = self
            .platform
            .sign_in(&battery.email, &battery.password)
            .await
            .map_err(|source| {
                tracing::error!(email = %battery.email, code = source.code(), "sign-in failed");
                RuleCheckError::SignIn {
                    email: battery.email.clone(),
                    source,
                }
            })?;
        tracing::info!(
            role = %battery.role,
            uid = %session.uid(),
            claim_role = ?session.claims.role,
            company_id = ?session.claims.company_id,
            "signed in"
        );

        let ctx = session.security_context();
        let mut outcomes = Vec::with_capacity(battery.checks.len());
        for phase in CheckPhase::ORDER {
            for check in battery.phase(phase) {
                let outcome = self.execute(&ctx, check).await;
                if outcome.passed {
                    tracing::info!(role = %battery.role, phase = phase.as_str(), check = %check.name, detail = %outcome.detail, "check passed");
                } else {
                    tracing::warn!(role = %battery.role, phase = phase.as_str(), check = %check.name, detail = %outcome.detail, "check failed");
                }
                outcomes.push(outcome);
            }
        }

        // Sessions are bearer tokens with no server-side record, so signing out
        // is discarding the token.
        let uid = session.uid().to_owned();
        drop(session);
        tracing::info!(role = %battery.role, uid = %uid, "signed out, token discarded");
        Ok(RoleReport {
            role: battery.role,
            uid,
            outcomes,
        })
    }

    async fn execute(&self, ctx: &SecurityContext, check: &Check) -> CheckOutcome {
        let (phase, name) = (check.phase, check.name.as_str());
        match &check.probe {
            Probe::Get { path, expect } => match self.platform.get(ctx, path).await {
                Ok(Some(doc)) => match changed_fields(expect, &stable_fields(&doc.fields)) {
                    changed if changed.is_empty() => {
                        CheckOutcome::pass(phase, name, format!("{} fields match", expect.len()))
                    }
                    changed => CheckOutcome::fail(phase, name, format!("fields changed: {}", changed.join(", "))),
                },
                Ok(None) => CheckOutcome::fail(phase, name, format!("{path} does not exist")),
                Err(e) => CheckOutcome::fail(phase, name, error_detail(&e)),
            },
            Probe::List { query, expect_ids } => match self.platform.query(ctx, query).await {
                Ok(docs) => {
                    let ids: Vec<&str> = docs.iter().map(|d| d.id()).collect();
                    match expect_ids {
                        Some(expected) if ids != *expected => CheckOutcome::fail(
                            phase,
                            name,
                            format!("expected {expected:?}, got {ids:?}"),
                        ),
                        _ => CheckOutcome::pass(phase, name, format!("{} documents", docs.len())),
                    }
                }
                Err(e) => CheckOutcome::fail(phase, name, error_detail(&e)),
            },
            Probe::StorageRoundTrip(path) => match self.round_trip(ctx, path).await {
                Ok(()) => CheckOutcome::pass(phase, name, format!("{path} uploaded, read and deleted")),
                Err(detail) => CheckOutcome::fail(phase, name, detail),
            },
            Probe::DenyGet(path) => expect_denied(phase, name, self.platform.get(ctx, path).await),
            Probe::DenyList(query) => expect_denied(phase, name, self.platform.query(ctx, query).await),
            Probe::DenyUpload(path) => expect_denied(
                phase,
                name,
                self.platform.upload(ctx, path, PROBE_BYTES.to_vec()).await,
            ),
            Probe::DenyWrite { path, fields } => expect_denied(
                phase,
                name,
                self.platform.set(ctx, path, fields.clone()).await,
            ),
        }
    }

    async fn round_trip(&self, ctx: &SecurityContext, path: &BlobPath) -> Result<(), String> {
        self.platform
            .upload(ctx, path, PROBE_BYTES.to_vec())
            .await
            .map_err(|e| format!("upload: {}", error_detail(&e)))?;
        let bytes = self
            .platform
            .download(ctx, path)
            .await
            .map_err(|e| format!("download: {}", error_detail(&e)))?;
        if bytes != PROBE_BYTES {
            return Err(format!("download returned {} unexpected bytes", bytes.len()));
        }
        self.platform
            .delete_object(ctx, path)
            .await
            .map_err(|e| format!("delete: {}", error_detail(&e)))
    }
}

/// Keys present in either map whose values differ, sorted.
fn changed_fields(expected: &Map<String, Value>, actual: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<&String> = expected.keys().chain(actual.keys()).collect();
    keys.sort();
    keys.dedup();
    keys.into_iter()
        .filter(|k| expected.get(*k) != actual.get(*k))
        .cloned()
        .collect()
}

fn error_detail(err: &PlatformError) -> String {
    format!("{} ({err})", err.code())
}

fn expect_denied<T>(phase: CheckPhase, name: &str, result: Result<T, PlatformError>) -> CheckOutcome {
    match result {
        Err(e) if e.is_permission_denied() => CheckOutcome::pass(phase, name, format!("denied: {}", e.code())),
        Err(e) => CheckOutcome::fail(phase, name, format!("unexpected error {}", error_detail(&e))),
        Ok(_) => CheckOutcome::fail(phase, name, "unexpectedly allowed"),
    }
}
