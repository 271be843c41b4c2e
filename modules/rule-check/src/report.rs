use std::fmt;

use tenantdash_security::Role;

use crate::plan::CheckPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub phase: CheckPhase,
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    pub(crate) fn pass(phase: CheckPhase, name: &str, detail: impl Into<String>) -> Self {
        Self {
            phase,
            name: name.to_owned(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub(crate) fn fail(phase: CheckPhase, name: &str, detail: impl Into<String>) -> Self {
        Self {
            phase,
            name: name.to_owned(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleReport {
    pub role: Role,
    pub uid: String,
    pub outcomes: Vec<CheckOutcome>,
}

impl RoleReport {
    #[must_use]
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCheckReport {
    pub roles: Vec<RoleReport>,
}

impl RuleCheckReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.roles
            .iter()
            .flat_map(|r| &r.outcomes)
            .filter(|o| o.passed)
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.roles.iter().map(|r| r.failures().count()).sum()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    #[must_use]
    pub fn role(&self, role: Role) -> Option<&RoleReport> {
        self.roles.iter().find(|r| r.role == role)
    }
}

impl fmt::Display for RuleCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for role in &self.roles {
            writeln!(f, "{} ({})", role.role, role.uid)?;
            for o in &role.outcomes {
                let mark = if o.passed { "PASS" } else { "FAIL" };
                writeln!(f, "  [{mark}] {:<15} {}: {}", o.phase.as_str(), o.name, o.detail)?;
            }
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}
