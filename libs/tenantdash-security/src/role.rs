use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role carried in the `role` custom claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "superAdmin")]
    SuperAdmin,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "vendor")]
    Vendor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::Vendor];

    /// Claim value as stored in tokens and user documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "superAdmin",
            Role::Admin => "admin",
            Role::Vendor => "vendor",
        }
    }

    /// Lower-case path segment used by dashboard routes.
    #[must_use]
    pub fn route_segment(self) -> &'static str {
        match self {
            Role::SuperAdmin => "superadmin",
            Role::Admin => "admin",
            Role::Vendor => "vendor",
        }
    }

    /// Staff roles see every record of their company.
    #[must_use]
    pub fn is_staff(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive: `superAdmin`, `superadmin` and `SUPERADMIN` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "vendor" => Ok(Role::Vendor),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}
