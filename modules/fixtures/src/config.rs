//! Fixture parameters.

use serde::{Deserialize, Serialize};
use tenantdash_security::Role;

/// Fixed uids of the three role accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleUids {
    pub super_admin: String,
    pub admin: String,
    pub vendor: String,
}

impl Default for RoleUids {
    fn default() -> Self {
        Self {
            super_admin: "superadmin-fixed".to_owned(),
            admin: "admin-fixed".to_owned(),
            vendor: "vendor-fixed".to_owned(),
        }
    }
}

impl RoleUids {
    #[must_use]
    pub fn uid(&self, role: Role) -> &str {
        match role {
            Role::SuperAdmin => &self.super_admin,
            Role::Admin => &self.admin,
            Role::Vendor => &self.vendor,
        }
    }
}

/// Parameters the fixture set is generated from.
///
/// Seeding and rule verification both derive their ids from one instance, so the two
/// cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureConfig {
    /// Home company of all three role accounts.
    pub company_id: String,
    pub company_name: String,

    /// Company used only for cross-company negatives.
    pub other_company_id: String,

    /// Second vendor inside the home company, for vendor-to-vendor isolation.
    pub other_vendor_id: String,

    /// Vendor owning the other company's records.
    pub foreign_vendor_id: String,

    pub roles: RoleUids,

    pub include_negative_fixtures: bool,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            company_id: "acme-company".to_owned(),
            company_name: "Acme Company".to_owned(),
            other_company_id: "other-company".to_owned(),
            other_vendor_id: "other-vendor".to_owned(),
            foreign_vendor_id: "someone-else".to_owned(),
            roles: RoleUids::default(),
            include_negative_fixtures: true,
        }
    }
}
