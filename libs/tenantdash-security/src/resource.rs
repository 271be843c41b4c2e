//! Addresses of platform resources.
//!
//! Documents live in a tree keyed by `(companyId, collectionKind, documentId)` plus the
//! two top-level collections `companies` and `users`:
//!
//! ```text
//! companies/{companyId}
//! companies/{companyId}/{vendors|jobs|tasks|shares|files}/{docId}
//! users/{uid}
//! ```
//!
//! Access rules are expressed against these paths, so a tenant boundary is a path
//! prefix rather than a field filter repeated on every query.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PathError;

pub const COMPANIES: &str = "companies";
pub const USERS: &str = "users";

/// Collections nested under a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopedKind {
    Vendors,
    Jobs,
    Tasks,
    Shares,
    Files,
}

impl ScopedKind {
    pub const ALL: [ScopedKind; 5] = [
        ScopedKind::Vendors,
        ScopedKind::Jobs,
        ScopedKind::Tasks,
        ScopedKind::Shares,
        ScopedKind::Files,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScopedKind::Vendors => "vendors",
            ScopedKind::Jobs => "jobs",
            ScopedKind::Tasks => "tasks",
            ScopedKind::Shares => "shares",
            ScopedKind::Files => "files",
        }
    }

    fn parse(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == segment)
    }
}

impl fmt::Display for ScopedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('/')
}

fn check_segment(segment: &str, path: &str) -> Result<(), PathError> {
    if valid_segment(segment) {
        Ok(())
    } else {
        Err(PathError::InvalidSegment {
            path: path.to_owned(),
        })
    }
}

/// Address of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocPath {
    Company {
        company_id: String,
    },
    User {
        uid: String,
    },
    Scoped {
        company_id: String,
        kind: ScopedKind,
        doc_id: String,
    },
}

impl DocPath {
    #[must_use]
    pub fn company(company_id: impl Into<String>) -> Self {
        Self::Company {
            company_id: company_id.into(),
        }
    }

    #[must_use]
    pub fn user(uid: impl Into<String>) -> Self {
        Self::User { uid: uid.into() }
    }

    #[must_use]
    pub fn scoped(
        company_id: impl Into<String>,
        kind: ScopedKind,
        doc_id: impl Into<String>,
    ) -> Self {
        Self::Scoped {
            company_id: company_id.into(),
            kind,
            doc_id: doc_id.into(),
        }
    }

    /// Collection this document belongs to.
    #[must_use]
    pub fn collection(&self) -> CollectionRef {
        match self {
            DocPath::Company { .. } => CollectionRef::Companies,
            DocPath::User { .. } => CollectionRef::Users,
            DocPath::Scoped {
                company_id, kind, ..
            } => CollectionRef::Scoped {
                company_id: company_id.clone(),
                kind: *kind,
            },
        }
    }

    #[must_use]
    pub fn doc_id(&self) -> &str {
        match self {
            DocPath::Company { company_id } => company_id,
            DocPath::User { uid } => uid,
            DocPath::Scoped { doc_id, .. } => doc_id,
        }
    }

    /// Company this document is nested under (a company document is its own root).
    #[must_use]
    pub fn company_id(&self) -> Option<&str> {
        match self {
            DocPath::Company { company_id } | DocPath::Scoped { company_id, .. } => {
                Some(company_id)
            }
            DocPath::User { .. } => None,
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocPath::Company { company_id } => write!(f, "{COMPANIES}/{company_id}"),
            DocPath::User { uid } => write!(f, "{USERS}/{uid}"),
            DocPath::Scoped {
                company_id,
                kind,
                doc_id,
            } => write!(f, "{COMPANIES}/{company_id}/{kind}/{doc_id}"),
        }
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<&str> = path.split('/').collect();
        for segment in &segments {
            check_segment(segment, path)?;
        }
        match segments.as_slice() {
            [COMPANIES, company_id] => Ok(DocPath::company(*company_id)),
            [USERS, uid] => Ok(DocPath::user(*uid)),
            [COMPANIES, company_id, kind, doc_id] => {
                let kind = ScopedKind::parse(kind).ok_or_else(|| PathError::UnknownCollection {
                    path: path.to_owned(),
                    collection: (*kind).to_owned(),
                })?;
                Ok(DocPath::scoped(*company_id, kind, *doc_id))
            }
            [collection, _] if *collection != COMPANIES && *collection != USERS => {
                Err(PathError::UnknownCollection {
                    path: path.to_owned(),
                    collection: (*collection).to_owned(),
                })
            }
            _ => Err(PathError::WrongShape {
                path: path.to_owned(),
                expected: "document",
            }),
        }
    }
}

impl TryFrom<String> for DocPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocPath> for String {
    fn from(value: DocPath) -> Self {
        value.to_string()
    }
}

/// Address of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionRef {
    Companies,
    Users,
    Scoped { company_id: String, kind: ScopedKind },
}

impl CollectionRef {
    #[must_use]
    pub fn scoped(company_id: impl Into<String>, kind: ScopedKind) -> Self {
        Self::Scoped {
            company_id: company_id.into(),
            kind,
        }
    }

    #[must_use]
    pub fn doc(&self, doc_id: impl Into<String>) -> DocPath {
        match self {
            CollectionRef::Companies => DocPath::company(doc_id),
            CollectionRef::Users => DocPath::user(doc_id),
            CollectionRef::Scoped { company_id, kind } => {
                DocPath::scoped(company_id.clone(), *kind, doc_id)
            }
        }
    }

    #[must_use]
    pub fn contains(&self, path: &DocPath) -> bool {
        path.collection() == *self
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionRef::Companies => f.write_str(COMPANIES),
            CollectionRef::Users => f.write_str(USERS),
            CollectionRef::Scoped { company_id, kind } => {
                write!(f, "{COMPANIES}/{company_id}/{kind}")
            }
        }
    }
}

impl FromStr for CollectionRef {
    type Err = PathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<&str> = path.split('/').collect();
        for segment in &segments {
            check_segment(segment, path)?;
        }
        match segments.as_slice() {
            [COMPANIES] => Ok(CollectionRef::Companies),
            [USERS] => Ok(CollectionRef::Users),
            [COMPANIES, company_id, kind] => {
                let kind = ScopedKind::parse(kind).ok_or_else(|| PathError::UnknownCollection {
                    path: path.to_owned(),
                    collection: (*kind).to_owned(),
                })?;
                Ok(CollectionRef::scoped(*company_id, kind))
            }
            _ => Err(PathError::WrongShape {
                path: path.to_owned(),
                expected: "collection",
            }),
        }
    }
}

/// Equality filter, the only query predicate the store supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqFilter {
    pub field: String,
    pub value: Value,
}

impl EqFilter {
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// Path of an object in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlobPath(String);

/// Tenant classification of a blob path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobScope<'a> {
    /// `companies/{companyId}/files/...`
    CompanyFiles { company_id: &'a str },
    /// `companies/{companyId}/shares/{vendorId}/...`
    VendorShare {
        company_id: &'a str,
        vendor_id: &'a str,
    },
    /// Anything else.
    Unscoped,
}

impl BlobPath {
    pub fn new(path: impl Into<String>) -> Result<Self, PathError> {
        let path = path.into();
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        if !path.split('/').all(valid_segment) {
            return Err(PathError::InvalidSegment { path });
        }
        Ok(Self(path))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn scope(&self) -> BlobScope<'_> {
        let segments: Vec<&str> = self.0.split('/').collect();
        match segments.as_slice() {
            [COMPANIES, company_id, "files", _, ..] => BlobScope::CompanyFiles { company_id },
            [COMPANIES, company_id, "shares", vendor_id, _, ..] => BlobScope::VendorShare {
                company_id,
                vendor_id,
            },
            _ => BlobScope::Unscoped,
        }
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// `companies/{companyId}/files/{name}`
    pub fn company_file(company_id: &str, name: &str) -> Result<Self, PathError> {
        Self::new(format!("{COMPANIES}/{company_id}/files/{name}"))
    }

    /// `companies/{companyId}/shares/{vendorId}/{name}`
    pub fn vendor_share(company_id: &str, vendor_id: &str, name: &str) -> Result<Self, PathError> {
        Self::new(format!("{COMPANIES}/{company_id}/shares/{vendor_id}/{name}"))
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BlobPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BlobPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlobPath> for String {
    fn from(value: BlobPath) -> Self {
        value.0
    }
}
