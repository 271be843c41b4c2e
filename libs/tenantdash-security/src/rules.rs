//! Tenant-scoped access rules.
//!
//! Reads are decided in two steps. The caller's claims and the addressed collection
//! produce a [`Grant`]: allowed outright, denied outright, or allowed only for documents
//! whose fields carry specific values. A single-document read checks those field values
//! against the stored document; a query must prove them through its equality filters,
//! otherwise the whole query is rejected.

use serde_json::{Map, Value};

use crate::claims::UserClaims;
use crate::context::{Principal, SecurityContext};
use crate::error::AccessError;
use crate::fields;
use crate::policy::AccessPolicy;
use crate::resource::{BlobPath, BlobScope, CollectionRef, DocPath, EqFilter, ScopedKind};
use crate::role::Role;

/// Blob operations subject to the prefix rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobOp {
    Read,
    Write,
    Delete,
}

impl BlobOp {
    fn as_str(self) -> &'static str {
        match self {
            BlobOp::Read => "read",
            BlobOp::Write => "write",
            BlobOp::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Grant {
    Allow,
    /// Allowed for documents where every `(field, value)` pair holds.
    When(Vec<(&'static str, String)>),
    Deny(String),
}

fn field_is(fields: &Map<String, Value>, name: &str, expected: &str) -> bool {
    fields.get(name).and_then(Value::as_str) == Some(expected)
}

#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    policy: AccessPolicy,
}

impl RuleEngine {
    #[must_use]
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn read_grant(&self, claims: &UserClaims, collection: &CollectionRef, doc_id: Option<&str>) -> Grant {
        let Some(role) = claims.role else {
            return match (collection, doc_id) {
                (CollectionRef::Users, Some(uid)) if uid == claims.uid => Grant::Allow,
                _ => Grant::Deny("no role claim".to_owned()),
            };
        };
        if role == Role::SuperAdmin {
            return Grant::Allow;
        }
        let Some(own_company) = claims.company_id.as_deref() else {
            return Grant::Deny("no companyId claim".to_owned());
        };

        match collection {
            CollectionRef::Companies => match doc_id {
                Some(id) if id == own_company => Grant::Allow,
                Some(_) => Grant::Deny("company outside caller's tenant".to_owned()),
                None => Grant::When(vec![(fields::COMPANY_ID, own_company.to_owned())]),
            },
            CollectionRef::Users => match (doc_id, role) {
                (Some(uid), _) if uid == claims.uid => Grant::Allow,
                (_, Role::Admin) => Grant::When(vec![(fields::COMPANY_ID, own_company.to_owned())]),
                _ => Grant::Deny("vendors may only read their own user document".to_owned()),
            },
            CollectionRef::Scoped { company_id, kind } => {
                if company_id != own_company {
                    return Grant::Deny(format!("cross-company read of {kind}"));
                }
                match role {
                    Role::Admin | Role::SuperAdmin => Grant::Allow,
                    Role::Vendor => {
                        if *kind == ScopedKind::Jobs && !self.policy.vendor_jobs_filtered() {
                            Grant::Allow
                        } else {
                            Grant::When(vec![(fields::VENDOR_ID, claims.uid.clone())])
                        }
                    }
                }
            }
        }
    }

    /// Single-document read. `doc` is the stored document, `None` when absent.
    ///
    /// A missing document is only readable when the path alone grants access.
    pub fn authorize_get(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
        doc: Option<&Map<String, Value>>,
    ) -> Result<(), AccessError> {
        let claims = match ctx.principal() {
            Principal::Service => return Ok(()),
            Principal::Anonymous => return Err(AccessError::Unauthenticated),
            Principal::User(claims) => claims,
        };
        let result = match self.read_grant(claims, &path.collection(), Some(path.doc_id())) {
            Grant::Allow => Ok(()),
            Grant::When(required) => match doc {
                Some(fields) if required.iter().all(|(f, v)| field_is(fields, f, v)) => Ok(()),
                Some(_) => Err(AccessError::denied("document fields outside caller's scope")),
                None => Err(AccessError::denied("document does not exist")),
            },
            Grant::Deny(reason) => Err(AccessError::denied(reason)),
        };
        if let Err(e) = &result {
            tracing::debug!(principal = %ctx.describe(), path = %path, error = %e, "read denied");
        }
        result
    }

    /// Collection query with equality filters.
    pub fn authorize_query(
        &self,
        ctx: &SecurityContext,
        collection: &CollectionRef,
        filters: &[EqFilter],
    ) -> Result<(), AccessError> {
        let claims = match ctx.principal() {
            Principal::Service => return Ok(()),
            Principal::Anonymous => return Err(AccessError::Unauthenticated),
            Principal::User(claims) => claims,
        };
        let result = match self.read_grant(claims, collection, None) {
            Grant::Allow => Ok(()),
            Grant::When(required) => {
                let proven = required.iter().all(|(field, value)| {
                    filters
                        .iter()
                        .any(|f| f.field == *field && f.value.as_str() == Some(value.as_str()))
                });
                if proven {
                    Ok(())
                } else {
                    let missing: Vec<&str> = required.iter().map(|(f, _)| *f).collect();
                    Err(AccessError::denied(format!(
                        "query must filter on {}",
                        missing.join(", ")
                    )))
                }
            }
            Grant::Deny(reason) => Err(AccessError::denied(reason)),
        };
        if let Err(e) = &result {
            tracing::debug!(
                principal = %ctx.describe(),
                collection = %collection,
                filters = filters.len(),
                error = %e,
                "query denied"
            );
        }
        result
    }

    fn write_grant(claims: &UserClaims, path: &DocPath) -> Result<(), AccessError> {
        match claims.role {
            Some(Role::SuperAdmin) => Ok(()),
            Some(Role::Admin) => match path {
                DocPath::Scoped { company_id, .. } if claims.belongs_to(company_id) => Ok(()),
                DocPath::Scoped { .. } => Err(AccessError::denied("cross-company write")),
                DocPath::Company { .. } | DocPath::User { .. } => Err(AccessError::denied(
                    "admins may only write company-scoped collections",
                )),
            },
            Some(Role::Vendor) => Err(AccessError::denied("vendors are read-only")),
            None => Err(AccessError::denied("no role claim")),
        }
    }

    /// Create or overwrite a document with `fields`.
    pub fn authorize_write(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
        fields: &Map<String, Value>,
    ) -> Result<(), AccessError> {
        let claims = match ctx.principal() {
            Principal::Service => return Ok(()),
            Principal::Anonymous => return Err(AccessError::Unauthenticated),
            Principal::User(claims) => claims,
        };
        let result = Self::write_grant(claims, path).and_then(|()| {
            let stamped = fields.get(fields::COMPANY_ID);
            match (claims.role, stamped, claims.company_id.as_deref()) {
                (Some(Role::Admin), Some(value), Some(own)) if value.as_str() != Some(own) => Err(
                    AccessError::denied("companyId field does not match caller's company"),
                ),
                _ => Ok(()),
            }
        });
        if let Err(e) = &result {
            tracing::debug!(principal = %ctx.describe(), path = %path, error = %e, "write denied");
        }
        result
    }

    pub fn authorize_delete(&self, ctx: &SecurityContext, path: &DocPath) -> Result<(), AccessError> {
        let claims = match ctx.principal() {
            Principal::Service => return Ok(()),
            Principal::Anonymous => return Err(AccessError::Unauthenticated),
            Principal::User(claims) => claims,
        };
        let result = Self::write_grant(claims, path);
        if let Err(e) = &result {
            tracing::debug!(principal = %ctx.describe(), path = %path, error = %e, "delete denied");
        }
        result
    }

    /// Blob read, write and delete share one prefix rule.
    pub fn authorize_blob(
        &self,
        ctx: &SecurityContext,
        path: &BlobPath,
        op: BlobOp,
    ) -> Result<(), AccessError> {
        let claims = match ctx.principal() {
            Principal::Service => return Ok(()),
            Principal::Anonymous => return Err(AccessError::Unauthenticated),
            Principal::User(claims) => claims,
        };
        let scope = path.scope();
        let result = match (claims.role, scope) {
            (_, BlobScope::Unscoped) => Err(AccessError::denied("path outside tenant prefixes")),
            (Some(Role::SuperAdmin), _) => Ok(()),
            (Some(Role::Admin), BlobScope::CompanyFiles { company_id })
            | (Some(Role::Admin), BlobScope::VendorShare { company_id, .. }) => {
                if claims.belongs_to(company_id) {
                    Ok(())
                } else {
                    Err(AccessError::denied("cross-company object"))
                }
            }
            (
                Some(Role::Vendor),
                BlobScope::VendorShare {
                    company_id,
                    vendor_id,
                },
            ) => {
                if claims.belongs_to(company_id) && vendor_id == claims.uid {
                    Ok(())
                } else {
                    Err(AccessError::denied("share folder of another vendor"))
                }
            }
            (Some(Role::Vendor), BlobScope::CompanyFiles { .. }) => {
                Err(AccessError::denied("vendors may only use their share folder"))
            }
            (None, _) => Err(AccessError::denied("no role claim")),
        };
        if let Err(e) = &result {
            tracing::debug!(
                principal = %ctx.describe(),
                path = %path,
                op = op.as_str(),
                error = %e,
                "blob access denied"
            );
        }
        result
    }

    /// Listing blobs under `prefix`.
    pub fn authorize_blob_list(&self, ctx: &SecurityContext, prefix: &str) -> Result<(), AccessError> {
        let claims = match ctx.principal() {
            Principal::Service => return Ok(()),
            Principal::Anonymous => return Err(AccessError::Unauthenticated),
            Principal::User(claims) => claims,
        };
        let company_prefix = claims
            .company_id
            .as_deref()
            .map(|cid| format!("companies/{cid}/"));
        let allowed = match (claims.role, company_prefix) {
            (Some(Role::SuperAdmin), _) => true,
            (Some(Role::Admin), Some(company)) => prefix.starts_with(&company),
            (Some(Role::Vendor), Some(company)) => {
                prefix.starts_with(&format!("{company}shares/{}/", claims.uid))
            }
            _ => false,
        };
        if allowed {
            Ok(())
        } else {
            tracing::debug!(principal = %ctx.describe(), prefix, "blob listing denied");
            Err(AccessError::denied("listing outside caller's prefix"))
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn user_ctx(uid: &str, role: Option<Role>) -> SecurityContext {
        let mut claims = UserClaims::new(uid).with_company("acme");
        claims.role = role;
        SecurityContext::for_user(claims)
    }

    #[test]
    fn roleless_user_reads_only_own_profile() {
        let engine = RuleEngine::default();
        let ctx = user_ctx("u1", None);
        assert!(engine.authorize_get(&ctx, &DocPath::user("u1"), None).is_ok());
        assert!(engine.authorize_get(&ctx, &DocPath::company("acme"), None).is_err());
        assert!(
            engine
                .authorize_query(&ctx, &CollectionRef::Users, &[])
                .is_err()
        );
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        let engine = RuleEngine::default();
        let ctx = SecurityContext::anonymous();
        assert_eq!(
            engine.authorize_get(&ctx, &DocPath::company("acme"), None),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn blob_list_prefixes() {
        let engine = RuleEngine::default();
        let vendor = user_ctx("v1", Some(Role::Vendor));
        assert!(
            engine
                .authorize_blob_list(&vendor, "companies/acme/shares/v1/")
                .is_ok()
        );
        assert!(
            engine
                .authorize_blob_list(&vendor, "companies/acme/files/")
                .is_err()
        );
        let admin = user_ctx("a1", Some(Role::Admin));
        assert!(engine.authorize_blob_list(&admin, "companies/acme/").is_ok());
        assert!(engine.authorize_blob_list(&admin, "companies/").is_err());
    }
}
