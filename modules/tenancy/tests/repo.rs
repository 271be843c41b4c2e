#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use local_platform::LocalPlatform;
use platform_sdk::{CustomClaims, DocumentClient, IdentityClient, NewUser};
use tenancy::{Company, Job, Task, TenancyRepo, UserProfile, to_fields};
use tenantdash_security::{
    AccessPolicy, DocPath, Role, SecurityContext, UserClaims, VendorJobVisibility,
};

const HOME: &str = "acme-company";
const OTHER: &str = "other-company";

fn task(id: &str, company: &str, vendor: &str) -> Task {
    Task {
        task_id: id.to_owned(),
        company_id: company.to_owned(),
        vendor_id: vendor.to_owned(),
        job_id: None,
        description: format!("task {id}"),
        created_at: None,
    }
}

fn job(id: &str, company: &str, vendor: &str) -> Job {
    Job {
        job_id: id.to_owned(),
        company_id: company.to_owned(),
        vendor_id: Some(vendor.to_owned()),
        title: format!("job {id}"),
        created_at: None,
    }
}

fn ctx(uid: &str, role: Role, company: &str) -> SecurityContext {
    SecurityContext::for_user(UserClaims::new(uid).with_role(role).with_company(company))
}

async fn seeded(policy: AccessPolicy) -> TenancyRepo<LocalPlatform> {
    let platform = Arc::new(LocalPlatform::in_memory(policy.clone()));
    let repo = TenancyRepo::new(Arc::clone(&platform), policy);
    let svc = SecurityContext::service();

    for company in [HOME, OTHER] {
        platform
            .set(
                &svc,
                &DocPath::company(company),
                to_fields(&Company {
                    company_id: company.to_owned(),
                    name: company.to_owned(),
                    created_at: None,
                })
                .unwrap(),
            )
            .await
            .unwrap();
    }
    for (uid, role, company) in [
        ("admin-fixed", Role::Admin, HOME),
        ("vendor-fixed", Role::Vendor, HOME),
        ("foreign-admin", Role::Admin, OTHER),
    ] {
        platform
            .create_user(
                &svc,
                NewUser {
                    uid: uid.to_owned(),
                    email: format!("{uid}@example.com"),
                    password: "secret123".to_owned(),
                    display_name: None,
                },
            )
            .await
            .unwrap();
        platform
            .set_custom_claims(&svc, uid, CustomClaims::new(role, company))
            .await
            .unwrap();
        platform
            .set(
                &svc,
                &DocPath::user(uid),
                to_fields(&UserProfile {
                    email: format!("{uid}@example.com"),
                    role,
                    company_id: company.to_owned(),
                    created_at: None,
                })
                .unwrap(),
            )
            .await
            .unwrap();
    }

    for t in [
        task("task-fixed", HOME, "vendor-fixed"),
        task("other-vendor-task", HOME, "other-vendor"),
    ] {
        let id = t.task_id.clone();
        repo.put_scoped(&svc, HOME, &id, &t).await.unwrap();
    }
    repo.put_scoped(&svc, OTHER, "other-company-task", &task("other-company-task", OTHER, "someone-else"))
        .await
        .unwrap();
    for j in [
        job("job-fixed", HOME, "vendor-fixed"),
        job("other-vendor-job", HOME, "other-vendor"),
    ] {
        let id = j.job_id.clone();
        repo.put_scoped(&svc, HOME, &id, &j).await.unwrap();
    }
    repo
}

#[tokio::test]
async fn vendor_task_list_is_narrowed_to_own_vendor_id() {
    let repo = seeded(AccessPolicy::default()).await;
    let vendor = ctx("vendor-fixed", Role::Vendor, HOME);

    let tasks = repo.tasks(&vendor, HOME).await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["task-fixed"]);
    assert_eq!(tasks[0].data.vendor_id, "vendor-fixed");

    let err = repo
        .task(&vendor, HOME, "other-vendor-task")
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
}

#[tokio::test]
async fn admin_sees_company_but_not_foreign_documents() {
    let repo = seeded(AccessPolicy::default()).await;
    let admin = ctx("admin-fixed", Role::Admin, HOME);

    let tasks = repo.tasks(&admin, HOME).await.unwrap();
    assert_eq!(tasks.len(), 2);

    let err = repo.tasks(&admin, OTHER).await.unwrap_err();
    assert_eq!(err.code(), Some("permission-denied"));

    let err = repo
        .task(&admin, OTHER, "other-company-task")
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let users = repo.users(&admin).await.unwrap();
    let mut uids: Vec<_> = users.iter().map(|r| r.id.as_str()).collect();
    uids.sort_unstable();
    assert_eq!(uids, ["admin-fixed", "vendor-fixed"]);

    let companies = repo.companies(&admin).await.unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].data.company_id, HOME);
}

#[tokio::test]
async fn super_admin_lists_across_companies() {
    let repo = seeded(AccessPolicy::default()).await;
    let sa = ctx("superadmin-fixed", Role::SuperAdmin, HOME);
    assert_eq!(repo.companies(&sa).await.unwrap().len(), 2);
    assert_eq!(repo.users(&sa).await.unwrap().len(), 3);
    assert_eq!(repo.tasks(&sa, OTHER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn job_listing_follows_visibility_policy() {
    let vendor = ctx("vendor-fixed", Role::Vendor, HOME);

    let wide = seeded(AccessPolicy::default()).await;
    assert_eq!(wide.jobs(&vendor, HOME).await.unwrap().len(), 2);

    let filtered = seeded(
        AccessPolicy::default().with_vendor_job_visibility(VendorJobVisibility::VendorFiltered),
    )
    .await;
    let jobs = filtered.jobs(&vendor, HOME).await.unwrap();
    let ids: Vec<_> = jobs.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["job-fixed"]);
}

#[tokio::test]
async fn missing_company_claim_is_reported() {
    let repo = seeded(AccessPolicy::default()).await;
    let claimless = SecurityContext::for_user(UserClaims::new("nobody").with_role(Role::Admin));
    assert!(matches!(
        repo.users(&claimless).await,
        Err(tenancy::RepoError::MissingCompany)
    ));
}
