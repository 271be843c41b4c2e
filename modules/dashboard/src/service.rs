use std::fmt;

use platform_sdk::{DocumentClient, Session};
use tenancy::{Company, Job, Record, Share, Task, TenancyRepo, UserProfile, VendorProfile};
use tenantdash_security::Role;

use crate::error::DashboardError;
use crate::gate::{DashboardRoute, GateDecision, authorize};

/// Data behind one role's dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    SuperAdmin {
        companies: Vec<Record<Company>>,
        users: Vec<Record<UserProfile>>,
    },
    Admin {
        company_id: String,
        vendors: Vec<Record<VendorProfile>>,
        jobs: Vec<Record<Job>>,
        tasks: Vec<Record<Task>>,
        shares: Vec<Record<Share>>,
    },
    Vendor {
        company_id: String,
        tasks: Vec<Record<Task>>,
        jobs: Vec<Record<Job>>,
        shares: Vec<Record<Share>>,
    },
}

pub struct DashboardService<P: DocumentClient + ?Sized> {
    repo: TenancyRepo<P>,
}

impl<P: DocumentClient + ?Sized> DashboardService<P> {
    pub fn new(repo: TenancyRepo<P>) -> Self {
        Self { repo }
    }

    /// Gate the route against the session's claims, then fetch the role's data.
    pub async fn load(
        &self,
        session: &Session,
        route: &DashboardRoute,
    ) -> Result<DashboardView, DashboardError> {
        if let GateDecision::Redirect(target) = authorize(Some(&session.claims), route) {
            return Err(DashboardError::Redirect(target));
        }
        let ctx = session.security_context();
        let company_id = route.company_id.as_str();

        let view = match route.role {
            Role::SuperAdmin => DashboardView::SuperAdmin {
                companies: self.repo.companies(&ctx).await?,
                users: self.repo.users(&ctx).await?,
            },
            Role::Admin => DashboardView::Admin {
                company_id: company_id.to_owned(),
                vendors: self.repo.vendors(&ctx, company_id).await?,
                jobs: self.repo.jobs(&ctx, company_id).await?,
                tasks: self.repo.tasks(&ctx, company_id).await?,
                shares: self.repo.shares(&ctx, company_id).await?,
            },
            Role::Vendor => {
                let (tasks, jobs, shares) = tokio::try_join!(
                    self.repo.tasks(&ctx, company_id),
                    self.repo.jobs(&ctx, company_id),
                    self.repo.shares(&ctx, company_id),
                )?;
                DashboardView::Vendor {
                    company_id: company_id.to_owned(),
                    tasks,
                    jobs,
                    shares,
                }
            }
        };
        tracing::info!(uid = %session.uid(), route = %route, "dashboard loaded");
        Ok(view)
    }
}

fn section<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    empty: &str,
    items: &[Record<T>],
    line: impl Fn(&Record<T>) -> String,
) -> fmt::Result {
    writeln!(f, "{title}:")?;
    if items.is_empty() {
        writeln!(f, "  {empty}")?;
    }
    for item in items {
        writeln!(f, "  - {}", line(item))?;
    }
    Ok(())
}

fn task_line(t: &Record<Task>) -> String {
    format!("{} {}", t.id, t.data.description)
}

fn job_line(j: &Record<Job>) -> String {
    format!("{} {}", j.id, j.data.title)
}

fn share_line(s: &Record<Share>) -> String {
    format!("{} {}", s.id, s.data.file_path)
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardView::SuperAdmin { companies, users } => {
                writeln!(f, "SuperAdmin Dashboard")?;
                section(f, "Companies", "No companies.", companies, |c| {
                    format!("{} ({})", c.data.name, c.id)
                })?;
                section(f, "Users", "No users.", users, |u| {
                    format!("{} - {}", u.data.email, u.data.role)
                })
            }
            DashboardView::Admin {
                company_id,
                vendors,
                jobs,
                tasks,
                shares,
            } => {
                writeln!(f, "Admin Dashboard - {company_id}")?;
                section(f, "Vendors", "No vendors.", vendors, |v| {
                    format!("{} ({})", v.data.name, v.id)
                })?;
                section(f, "Jobs", "No jobs yet.", jobs, job_line)?;
                section(f, "Tasks", "No tasks yet.", tasks, task_line)?;
                section(f, "Shares", "No shared files yet.", shares, share_line)
            }
            DashboardView::Vendor {
                company_id,
                tasks,
                jobs,
                shares,
            } => {
                writeln!(f, "Vendor Dashboard - {company_id}")?;
                section(f, "Assigned Tasks", "No tasks yet.", tasks, task_line)?;
                section(f, "Assigned Jobs", "No jobs yet.", jobs, job_line)?;
                section(f, "Shared Files", "No shared files yet.", shares, share_line)
            }
        }
    }
}
