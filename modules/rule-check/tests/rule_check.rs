#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use fixtures::{FixtureConfig, FixtureSet, Seeder, ids};
use local_platform::LocalPlatform;
use platform_sdk::{DocumentClient, IdentityClient, Query};
use rule_check::{CheckPhase, RuleCheckError, RuleCheckPlan, RuleCheckRunner};
use tenantdash_security::{
    AccessPolicy, CollectionRef, DocPath, Role, ScopedKind, VendorJobVisibility, fields,
};
use time::OffsetDateTime;

async fn seeded(policy: AccessPolicy) -> (Arc<LocalPlatform>, FixtureSet) {
    let platform = Arc::new(LocalPlatform::in_memory(policy));
    let set = FixtureSet::build(&FixtureConfig::default(), OffsetDateTime::now_utc()).unwrap();
    Seeder::new(Arc::clone(&platform)).seed(&set).await.unwrap();
    (platform, set)
}

#[tokio::test]
async fn vendor_sees_only_own_tasks_after_seed() {
    let (platform, _) = seeded(AccessPolicy::default()).await;

    let session = platform
        .sign_in("vendor@example.com", "vendor123")
        .await
        .unwrap();
    assert_eq!(session.claims.role, Some(Role::Vendor));
    let ctx = session.security_context();

    let own = Query::new(CollectionRef::scoped("acme-company", ScopedKind::Tasks))
        .where_eq(fields::VENDOR_ID, "vendor-fixed");
    let tasks = platform.query(&ctx, &own).await.unwrap();
    let task_ids: Vec<_> = tasks.iter().map(|d| d.id()).collect();
    assert_eq!(task_ids, [ids::TASK]);

    let err = platform
        .get(
            &ctx,
            &DocPath::scoped("acme-company", ScopedKind::Tasks, ids::OTHER_VENDOR_TASK),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "permission-denied");
}

#[tokio::test]
async fn every_check_passes_on_seeded_platform() {
    for visibility in [VendorJobVisibility::CompanyWide, VendorJobVisibility::VendorFiltered] {
        let policy = AccessPolicy::default().with_vendor_job_visibility(visibility);
        let (platform, set) = seeded(policy.clone()).await;

        let plan = RuleCheckPlan::from_fixtures(&set, &policy).unwrap();
        let report = RuleCheckRunner::new(Arc::clone(&platform))
            .run(&plan)
            .await
            .unwrap();

        assert!(report.all_passed(), "{visibility:?}:\n{report}");
        assert_eq!(report.roles.len(), 3);
        let vendor = report.role(Role::Vendor).unwrap();
        assert_eq!(vendor.uid, "vendor-fixed");
        assert!(
            vendor
                .outcomes
                .iter()
                .any(|o| o.phase == CheckPhase::NegativeWrites)
        );
    }
}

#[tokio::test]
async fn storage_probes_leave_no_objects_behind() {
    let (platform, set) = seeded(AccessPolicy::default()).await;
    let plan = RuleCheckPlan::from_fixtures(&set, &AccessPolicy::default()).unwrap();
    RuleCheckRunner::new(Arc::clone(&platform))
        .run(&plan)
        .await
        .unwrap();

    let svc = tenantdash_security::SecurityContext::service();
    let objects = platform_sdk::BlobClient::list(platform.as_ref(), &svc, "")
        .await
        .unwrap();
    assert_eq!(objects.len(), set.blobs.len());
}

#[tokio::test]
async fn policy_mismatch_is_reported_not_fatal() {
    // Plan expects filtered jobs, platform serves them company-wide.
    let (platform, set) = seeded(AccessPolicy::default()).await;
    let filtered =
        AccessPolicy::default().with_vendor_job_visibility(VendorJobVisibility::VendorFiltered);
    let plan = RuleCheckPlan::from_fixtures(&set, &filtered).unwrap();

    let report = RuleCheckRunner::new(platform).run(&plan).await.unwrap();
    let failures: Vec<_> = report
        .role(Role::Vendor)
        .unwrap()
        .failures()
        .map(|o| o.name.as_str())
        .collect();
    assert_eq!(failures, ["get other vendor's job"]);
}

#[tokio::test]
async fn missing_account_aborts_run() {
    let platform = Arc::new(LocalPlatform::in_memory(AccessPolicy::default()));
    let set = FixtureSet::build(&FixtureConfig::default(), OffsetDateTime::now_utc()).unwrap();
    let plan = RuleCheckPlan::from_fixtures(&set, &AccessPolicy::default()).unwrap();

    let err = RuleCheckRunner::new(platform).run(&plan).await.unwrap_err();
    match err {
        RuleCheckError::SignIn { email, source } => {
            assert_eq!(email, "superadmin@example.com");
            assert_eq!(source.code(), "auth/invalid-credential");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn edited_document_fails_read_check_for_every_role() {
    let (platform, set) = seeded(AccessPolicy::default()).await;
    let path = DocPath::scoped("acme-company", ScopedKind::Tasks, ids::TASK);
    let svc = tenantdash_security::SecurityContext::service();
    let mut doc = platform.get(&svc, &path).await.unwrap().unwrap().fields;
    doc.insert("description".to_owned(), "TAMPERED".into());
    platform.set(&svc, &path, doc).await.unwrap();

    let plan = RuleCheckPlan::from_fixtures(&set, &AccessPolicy::default()).unwrap();
    let report = RuleCheckRunner::new(platform).run(&plan).await.unwrap();

    assert!(!report.all_passed());
    for role in Role::ALL {
        let failures: Vec<_> = report.role(role).unwrap().failures().collect();
        assert_eq!(failures.len(), 1, "{role}:\n{report}");
        assert_eq!(failures[0].name, "get task");
        assert_eq!(failures[0].detail, "fields changed: description");
    }
}

#[tokio::test]
async fn reseeded_timestamps_do_not_fail_read_checks() {
    let (platform, _) = seeded(AccessPolicy::default()).await;
    let later = FixtureSet::build(
        &FixtureConfig::default(),
        OffsetDateTime::now_utc() + time::Duration::days(1),
    )
    .unwrap();

    let plan = RuleCheckPlan::from_fixtures(&later, &AccessPolicy::default()).unwrap();
    let report = RuleCheckRunner::new(platform).run(&plan).await.unwrap();
    assert!(report.all_passed(), "{report}");
}
