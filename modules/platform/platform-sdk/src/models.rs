//! Transport-agnostic models shared by platform clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tenantdash_security::{CollectionRef, DocPath, EqFilter, Role, SecurityContext, UserClaims};

use crate::error::PlatformError;

/// Input for creating an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub uid: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Custom claims attached to an identity out-of-band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

impl CustomClaims {
    #[must_use]
    pub fn new(role: Role, company_id: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            company_id: Some(company_id.into()),
        }
    }
}

/// Identity as returned by administrative calls. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub custom_claims: CustomClaims,
}

impl UserRecord {
    #[must_use]
    pub fn claims(&self) -> UserClaims {
        UserClaims {
            uid: self.uid.clone(),
            email: Some(self.email.clone()),
            role: self.custom_claims.role,
            company_id: self.custom_claims.company_id.clone(),
        }
    }
}

/// One page of [`crate::IdentityClient::list_users`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<UserRecord>,
    /// Pass back to fetch the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Payload of a signed ID token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(
        rename = "companyId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_id: Option<String>,
}

impl IdTokenClaims {
    #[must_use]
    pub fn user_claims(&self) -> UserClaims {
        UserClaims {
            uid: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
            company_id: self.company_id.clone(),
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id_token: String,
    pub claims: UserClaims,
}

impl Session {
    #[must_use]
    pub fn security_context(&self) -> SecurityContext {
        SecurityContext::for_user(self.claims.clone())
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.claims.uid
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocPath,
    pub fields: Map<String, Value>,
}

impl Document {
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.doc_id()
    }

    /// Deserialize the fields into a typed entity.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PlatformError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            PlatformError::Internal(format!("document {} has unexpected shape: {e}", self.path))
        })
    }
}

/// Collection query with equality filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionRef,
    pub filters: Vec<EqFilter>,
}

impl Query {
    #[must_use]
    pub fn new(collection: CollectionRef) -> Self {
        Self {
            collection,
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(EqFilter::eq(field, value));
        self
    }

    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.collection.contains(&doc.path) && self.filters.iter().all(|f| f.matches(&doc.fields))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;
    use tenantdash_security::ScopedKind;

    #[test]
    fn id_token_claims_use_camel_case_company() {
        let claims = IdTokenClaims {
            iss: "local".to_owned(),
            aud: "demo".to_owned(),
            sub: "vendor-fixed".to_owned(),
            email: None,
            iat: 0,
            exp: 10,
            role: Some(Role::Vendor),
            company_id: Some("acme-company".to_owned()),
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["companyId"], "acme-company");
        assert_eq!(value["role"], "vendor");
        assert_eq!(claims.user_claims().uid, "vendor-fixed");
    }

    #[test]
    fn query_matches_collection_and_filters() {
        let query = Query::new(CollectionRef::scoped("acme", ScopedKind::Tasks))
            .where_eq("vendorId", "v1");
        let Value::Object(fields) = json!({ "vendorId": "v1" }) else {
            unreachable!()
        };
        let hit = Document {
            path: DocPath::scoped("acme", ScopedKind::Tasks, "t1"),
            fields: fields.clone(),
        };
        let wrong_kind = Document {
            path: DocPath::scoped("acme", ScopedKind::Jobs, "t1"),
            fields,
        };
        assert!(query.matches(&hit));
        assert!(!query.matches(&wrong_kind));
    }
}
