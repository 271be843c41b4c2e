#![allow(clippy::unwrap_used, clippy::expect_used)]

use local_platform::{LocalPlatform, LocalPlatformConfig};
use platform_sdk::{
    BlobClient, CustomClaims, DocumentClient, IdentityClient, NewUser, PlatformError, Query,
};
use serde_json::{Map, Value, json};
use tenantdash_security::{
    AccessPolicy, BlobPath, CollectionRef, DocPath, Role, ScopedKind, SecurityContext,
};

fn new_user(uid: &str, email: &str) -> NewUser {
    NewUser {
        uid: uid.to_owned(),
        email: email.to_owned(),
        password: "secret123".to_owned(),
        display_name: None,
    }
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

async fn platform_with_vendor() -> LocalPlatform {
    let platform = LocalPlatform::in_memory(AccessPolicy::default());
    let svc = SecurityContext::service();
    platform
        .create_user(&svc, new_user("vendor-fixed", "vendor@example.com"))
        .await
        .unwrap();
    platform
        .set_custom_claims(
            &svc,
            "vendor-fixed",
            CustomClaims::new(Role::Vendor, "acme-company"),
        )
        .await
        .unwrap();
    for (id, vendor) in [("task-fixed", "vendor-fixed"), ("other-vendor-task", "other-vendor")] {
        platform
            .set(
                &svc,
                &DocPath::scoped("acme-company", ScopedKind::Tasks, id),
                fields(json!({ "taskId": id, "companyId": "acme-company", "vendorId": vendor })),
            )
            .await
            .unwrap();
    }
    platform
}

#[tokio::test]
async fn duplicate_identities_are_rejected_with_codes() {
    let platform = LocalPlatform::in_memory(AccessPolicy::default());
    let svc = SecurityContext::service();
    platform
        .create_user(&svc, new_user("u1", "one@example.com"))
        .await
        .unwrap();

    let err = platform
        .create_user(&svc, new_user("u1", "other@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "auth/uid-already-exists");

    let err = platform
        .create_user(&svc, new_user("u2", "ONE@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "auth/email-already-exists");
    assert!(err.is_already_exists());
}

#[tokio::test]
async fn sign_in_issues_verifiable_token_with_claims() {
    let platform = platform_with_vendor().await;

    let err = platform
        .sign_in("vendor@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err, PlatformError::InvalidCredential);

    let session = platform
        .sign_in("vendor@example.com", "secret123")
        .await
        .unwrap();
    assert_eq!(session.claims.role, Some(Role::Vendor));
    assert_eq!(session.claims.company_id.as_deref(), Some("acme-company"));

    let verified = platform.verify_id_token(&session.id_token).await.unwrap();
    assert_eq!(verified.sub, "vendor-fixed");
    assert_eq!(verified.company_id.as_deref(), Some("acme-company"));

    let foreign = LocalPlatform::open(
        LocalPlatformConfig {
            token_secret: "another-secret".to_owned(),
            ..LocalPlatformConfig::default()
        },
        AccessPolicy::default(),
    )
    .unwrap();
    let err = foreign.verify_id_token(&session.id_token).await.unwrap_err();
    assert_eq!(err.code(), "auth/invalid-id-token");
}

#[tokio::test]
async fn list_users_pages_in_uid_order() {
    let platform = LocalPlatform::in_memory(AccessPolicy::default());
    let svc = SecurityContext::service();
    for i in [3, 1, 4, 0, 2] {
        platform
            .create_user(&svc, new_user(&format!("user-{i}"), &format!("u{i}@example.com")))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut token = None;
    let mut pages = 0;
    loop {
        let page = platform
            .list_users(&svc, 2, token.as_deref())
            .await
            .unwrap();
        pages += 1;
        seen.extend(page.users.into_iter().map(|u| u.uid));
        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    assert_eq!(pages, 3);
    assert_eq!(seen, ["user-0", "user-1", "user-2", "user-3", "user-4"]);
}

#[tokio::test]
async fn administrative_calls_need_service_context() {
    let platform = platform_with_vendor().await;
    let session = platform
        .sign_in("vendor@example.com", "secret123")
        .await
        .unwrap();
    let err = platform
        .list_users(&session.security_context(), 10, None)
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
}

#[tokio::test]
async fn vendor_queries_and_reads_are_rule_checked() {
    let platform = platform_with_vendor().await;
    let session = platform
        .sign_in("vendor@example.com", "secret123")
        .await
        .unwrap();
    let ctx = session.security_context();
    let tasks = CollectionRef::scoped("acme-company", ScopedKind::Tasks);

    let err = platform.query(&ctx, &Query::new(tasks.clone())).await.unwrap_err();
    assert_eq!(err.code(), "permission-denied");

    let docs = platform
        .query(&ctx, &Query::new(tasks).where_eq("vendorId", "vendor-fixed"))
        .await
        .unwrap();
    let ids: Vec<_> = docs.iter().map(|d| d.id().to_owned()).collect();
    assert_eq!(ids, ["task-fixed"]);

    let err = platform
        .get(
            &ctx,
            &DocPath::scoped("acme-company", ScopedKind::Tasks, "other-vendor-task"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "permission-denied");

    let err = platform
        .get(&SecurityContext::anonymous(), &DocPath::company("acme-company"))
        .await
        .unwrap_err();
    assert_eq!(err, PlatformError::Unauthenticated);
}

#[tokio::test]
async fn denied_upload_creates_nothing() {
    let platform = platform_with_vendor().await;
    let ctx = platform
        .sign_in("vendor@example.com", "secret123")
        .await
        .unwrap()
        .security_context();

    let forbidden = BlobPath::new("companies/acme-company/shares/someOtherVendor/forbidden.txt").unwrap();
    let err = platform
        .upload(&ctx, &forbidden, b"forbidden".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "storage/unauthorized");

    let all = platform
        .list(&SecurityContext::service(), "")
        .await
        .unwrap();
    assert!(all.is_empty());

    let own = BlobPath::new("companies/acme-company/shares/vendor-fixed/test-vendor.txt").unwrap();
    platform.upload(&ctx, &own, b"hello world".to_vec()).await.unwrap();
    assert_eq!(platform.download(&ctx, &own).await.unwrap(), b"hello world");
    platform.delete_object(&ctx, &own).await.unwrap();
    let err = platform.download(&ctx, &own).await.unwrap_err();
    assert_eq!(err.code(), "storage/object-not-found");
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = LocalPlatformConfig {
        state_path: Some(dir.path().join("platform.json")),
        ..LocalPlatformConfig::default()
    };
    let svc = SecurityContext::service();

    {
        let platform = LocalPlatform::open(config.clone(), AccessPolicy::default()).unwrap();
        platform
            .create_user(&svc, new_user("admin-fixed", "admin@example.com"))
            .await
            .unwrap();
        platform
            .set(
                &svc,
                &DocPath::company("acme-company"),
                fields(json!({ "name": "Acme Company", "companyId": "acme-company" })),
            )
            .await
            .unwrap();
    }

    let reopened = LocalPlatform::open(config, AccessPolicy::default()).unwrap();
    let company = reopened
        .get(&svc, &DocPath::company("acme-company"))
        .await
        .unwrap()
        .expect("company persisted");
    assert_eq!(company.fields["name"], "Acme Company");
    reopened
        .sign_in("admin@example.com", "secret123")
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_snapshot_write_leaves_memory_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let config = LocalPlatformConfig {
        state_path: Some(blocker.join("platform.json")),
        ..LocalPlatformConfig::default()
    };
    let platform = LocalPlatform::open(config, AccessPolicy::default()).unwrap();
    let svc = SecurityContext::service();

    for _ in 0..2 {
        let err = platform
            .create_user(&svc, new_user("admin-fixed", "admin@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "internal");
    }
    let err = platform
        .sign_in("admin@example.com", "secret123")
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::InvalidCredential));
    assert!(platform.list_users(&svc, 10, None).await.unwrap().users.is_empty());
}
