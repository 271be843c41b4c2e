//! Route authorization.
//!
//! Decisions are pure functions of the current claims and the requested route; nothing
//! is cached, so callers re-evaluate on every navigation or auth state change.

use std::fmt;
use std::str::FromStr;

use tenantdash_security::{Role, UserClaims};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// `/{companyId}/{role}/dashboard`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRoute {
    pub company_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a dashboard route: '{0}'")]
pub struct RouteError(pub String);

impl DashboardRoute {
    #[must_use]
    pub fn new(company_id: impl Into<String>, role: Role) -> Self {
        Self {
            company_id: company_id.into(),
            role,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DashboardRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/dashboard", self.company_id, self.role.as_str())
    }
}

impl FromStr for DashboardRoute {
    type Err = RouteError;

    /// Role segments match case-insensitively.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            [company_id, role, "dashboard"] if !company_id.is_empty() => {
                let role = role
                    .parse::<Role>()
                    .map_err(|_| RouteError(path.to_owned()))?;
                Ok(Self::new(*company_id, role))
            }
            _ => Err(RouteError(path.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Unauthorized,
}

impl RedirectTarget {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Login => LOGIN_PATH,
            RedirectTarget::Unauthorized => UNAUTHORIZED_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(RedirectTarget),
}

impl GateDecision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == GateDecision::Allow
    }
}

/// Allow iff the claims' role and company both equal the route's.
#[must_use]
pub fn authorize(claims: Option<&UserClaims>, route: &DashboardRoute) -> GateDecision {
    let Some(claims) = claims else {
        return GateDecision::Redirect(RedirectTarget::Login);
    };
    if claims.has_role(route.role) && claims.belongs_to(&route.company_id) {
        GateDecision::Allow
    } else {
        tracing::info!(
            uid = %claims.uid,
            role = ?claims.role,
            company_id = ?claims.company_id,
            route = %route,
            "dashboard route denied"
        );
        GateDecision::Redirect(RedirectTarget::Unauthorized)
    }
}

/// Guard for pages open to a fixed set of roles regardless of company.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Vec<Role>,
}

impl RoleGuard {
    #[must_use]
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }

    #[must_use]
    pub fn check(&self, claims: Option<&UserClaims>) -> GateDecision {
        match claims {
            None => GateDecision::Redirect(RedirectTarget::Login),
            Some(c) if c.role.is_some_and(|r| self.allowed.contains(&r)) => GateDecision::Allow,
            Some(_) => GateDecision::Redirect(RedirectTarget::Unauthorized),
        }
    }
}

/// Landing page per role.
#[must_use]
pub fn home_route(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::SuperAdmin) => "/superadmin",
        Some(Role::Admin) => "/admin",
        Some(Role::Vendor) => "/vendor",
        None => LOGIN_PATH,
    }
}

/// Post-login destination: the caller's own dashboard, or login when the claims are
/// incomplete.
#[must_use]
pub fn dashboard_path(claims: &UserClaims) -> String {
    match (claims.role, claims.company_id.as_deref()) {
        (Some(role), Some(company_id)) => DashboardRoute::new(company_id, role).path(),
        _ => LOGIN_PATH.to_owned(),
    }
}
