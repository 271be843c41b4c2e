use crate::claims::UserClaims;
use crate::role::Role;

/// Who is making a platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Administrative SDK access; access rules do not apply.
    Service,
    /// A signed-in end user.
    User(UserClaims),
    /// No identity at all.
    Anonymous,
}

/// `SecurityContext` encapsulates the caller identity for a platform operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Principal,
}

impl SecurityContext {
    /// Context for seeding and wipe tooling.
    #[must_use]
    pub fn service() -> Self {
        Self {
            principal: Principal::Service,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            principal: Principal::Anonymous,
        }
    }

    #[must_use]
    pub fn for_user(claims: UserClaims) -> Self {
        Self {
            principal: Principal::User(claims),
        }
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn is_service(&self) -> bool {
        matches!(self.principal, Principal::Service)
    }

    #[must_use]
    pub fn claims(&self) -> Option<&UserClaims> {
        match &self.principal {
            Principal::User(claims) => Some(claims),
            Principal::Service | Principal::Anonymous => None,
        }
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.claims().map(|c| c.uid.as_str())
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.claims().and_then(|c| c.role)
    }

    #[must_use]
    pub fn company_id(&self) -> Option<&str> {
        self.claims().and_then(|c| c.company_id.as_deref())
    }

    /// Vendor id that list queries must be narrowed to, if any.
    #[must_use]
    pub fn vendor_scope(&self) -> Option<&str> {
        match self.role() {
            Some(Role::Vendor) => self.uid(),
            _ => None,
        }
    }

    /// Short form for log fields.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.principal {
            Principal::Service => "service".to_owned(),
            Principal::Anonymous => "anonymous".to_owned(),
            Principal::User(c) => format!(
                "{}({})",
                c.uid,
                c.role.map_or("no-role", Role::as_str)
            ),
        }
    }
}
