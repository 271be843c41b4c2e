use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use dashboard::{AuthStore, DashboardRoute, DashboardService, dashboard_path};
use fixtures::{FixtureSet, Seeder, nuke_blobs, nuke_documents, nuke_users};
use local_platform::LocalPlatform;
use rule_check::{RuleCheckPlan, RuleCheckRunner};
use tenancy::TenancyRepo;
use tenantdash_security::UserClaims;
use time::OffsetDateTime;

use crate::config::AppConfig;

/// Ask for a literal `yes`. Anything else, including end of input or bytes
/// that are not UTF-8, declines.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> anyhow::Result<bool> {
    write!(output, "{prompt} Type 'yes' to continue: ")?;
    output.flush()?;
    let mut answer = Vec::new();
    input.read_until(b'\n', &mut answer)?;
    Ok(String::from_utf8_lossy(&answer).trim().eq_ignore_ascii_case("yes"))
}

fn confirm_stdin(prompt: &str) -> anyhow::Result<bool> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    confirm(prompt, &mut stdin.lock(), &mut stdout)
}

pub struct AppContext {
    pub config: AppConfig,
    pub platform: Arc<LocalPlatform>,
}

impl AppContext {
    pub fn open(config: AppConfig) -> anyhow::Result<Self> {
        let platform = LocalPlatform::open(config.platform.clone(), config.access.clone())
            .context("failed to open local platform")?;
        Ok(Self {
            config,
            platform: Arc::new(platform),
        })
    }

    fn fixture_set(&self) -> anyhow::Result<FixtureSet> {
        FixtureSet::build(&self.config.fixtures, OffsetDateTime::now_utc())
            .context("invalid fixture configuration")
    }
}

pub async fn seed(ctx: &AppContext) -> anyhow::Result<()> {
    let set = ctx.fixture_set()?;
    let report = Seeder::new(Arc::clone(&ctx.platform)).seed(&set).await?;
    println!(
        "Seeded company {}: {} users created, {} already existed, {} documents, {} objects",
        set.company_id(),
        report.users_created,
        report.users_existing,
        report.documents_written,
        report.blobs_uploaded
    );
    Ok(())
}

pub async fn set_claims(ctx: &AppContext) -> anyhow::Result<()> {
    let set = ctx.fixture_set()?;
    let count = Seeder::new(Arc::clone(&ctx.platform))
        .assign_claims(&set)
        .await?;
    println!("Custom claims set for {count} users");
    Ok(())
}

pub async fn nuke_store(ctx: &AppContext) -> anyhow::Result<()> {
    if !confirm_stdin("This will delete ALL documents and ALL stored objects.")? {
        println!("Aborted.");
        return Ok(());
    }
    let documents = nuke_documents(ctx.platform.as_ref()).await?;
    let objects = nuke_blobs(ctx.platform.as_ref()).await?;
    println!("Deleted {documents} documents and {objects} objects");
    Ok(())
}

pub async fn nuke_identities(ctx: &AppContext) -> anyhow::Result<()> {
    if !confirm_stdin("This will delete ALL users.")? {
        println!("Aborted.");
        return Ok(());
    }
    let users = nuke_users(ctx.platform.as_ref()).await?;
    println!("Deleted {users} users");
    Ok(())
}

/// Failed checks are reported but do not fail the command; a failed sign-in does.
pub async fn check_rules(ctx: &AppContext) -> anyhow::Result<()> {
    let set = ctx.fixture_set()?;
    let plan = RuleCheckPlan::from_fixtures(&set, &ctx.config.access)?;
    let report = RuleCheckRunner::new(Arc::clone(&ctx.platform))
        .run(&plan)
        .await?;
    println!("{report}");
    if !report.all_passed() {
        tracing::warn!(failed = report.failed(), "some rule checks failed");
    }
    Ok(())
}

pub async fn reset(ctx: &AppContext) -> anyhow::Result<()> {
    seed(ctx).await?;
    check_rules(ctx).await
}

pub async fn show_dashboard(
    ctx: &AppContext,
    email: &str,
    password: &str,
    route: Option<&str>,
) -> anyhow::Result<()> {
    let store = AuthStore::new(Arc::clone(&ctx.platform));
    let session = store.sign_in(email, password).await?;

    let path = match route {
        Some(route) => route.to_owned(),
        None => dashboard_path(&session.claims),
    };
    let route: DashboardRoute = match path.parse() {
        Ok(route) => route,
        Err(_) => {
            println!("Redirect: {path}");
            return Ok(());
        }
    };

    let repo = TenancyRepo::new(Arc::clone(&ctx.platform), ctx.config.access.clone());
    match DashboardService::new(repo).load(&session, &route).await {
        Ok(view) => println!("{view}"),
        Err(dashboard::DashboardError::Redirect(target)) => {
            println!("Redirect: {}", target.path());
        }
        Err(e) => return Err(e.into()),
    }
    store.sign_out();
    Ok(())
}

/// What the verified token says about the account, one claim per line.
fn describe_claims(claims: &UserClaims) -> String {
    let role = claims.role.map_or("No role", |r| r.as_str());
    format!(
        "UID: {}\nEmail: {}\nRole: {role}\nCompany: {}",
        claims.uid,
        claims.email.as_deref().unwrap_or("No email"),
        claims.company_id.as_deref().unwrap_or("No company"),
    )
}

/// Development aid: show the claims a sign-in yields without opening a dashboard.
pub async fn whoami(ctx: &AppContext, email: &str, password: &str) -> anyhow::Result<()> {
    let store = AuthStore::new(Arc::clone(&ctx.platform));
    let session = store.sign_in(email, password).await?;
    println!("{}", describe_claims(&session.claims));
    store.sign_out();
    Ok(())
}
