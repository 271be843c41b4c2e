//! Tenant entities as stored in the document store.
//!
//! Field names are camelCase on the wire; every entity carries `createdAt` as an
//! RFC 3339 timestamp.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tenantdash_security::{Role, ScopedKind};
use time::OffsetDateTime;

use crate::error::RepoError;

/// Entities stored under `companies/{companyId}/{kind}/`.
pub trait ScopedEntity: Serialize + DeserializeOwned + Send {
    const KIND: ScopedKind;
}

/// A decoded document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: String,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub company_id: String,
    pub name: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Profile document at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub role: Role,
    pub company_id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub vendor_id: String,
    pub company_id: String,
    pub name: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub title: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: String,
    pub company_id: String,
    pub vendor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub description: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub share_id: String,
    pub company_id: String,
    pub vendor_id: String,
    pub file_path: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Metadata for an object in the company's file area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_path: String,
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub uploaded_by: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl ScopedEntity for VendorProfile {
    const KIND: ScopedKind = ScopedKind::Vendors;
}

impl ScopedEntity for Job {
    const KIND: ScopedKind = ScopedKind::Jobs;
}

impl ScopedEntity for Task {
    const KIND: ScopedKind = ScopedKind::Tasks;
}

impl ScopedEntity for Share {
    const KIND: ScopedKind = ScopedKind::Shares;
}

impl ScopedEntity for FileRecord {
    const KIND: ScopedKind = ScopedKind::Files;
}

/// Encode an entity as document fields.
pub fn to_fields<T: Serialize>(entity: &T) -> Result<Map<String, Value>, RepoError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RepoError::Encode(format!(
            "entity encoded as {other} instead of an object"
        ))),
        Err(e) => Err(RepoError::Encode(e.to_string())),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn task_fields_are_camel_case_with_rfc3339_timestamp() {
        let task = Task {
            task_id: "task-fixed".to_owned(),
            company_id: "acme-company".to_owned(),
            vendor_id: "vendor-fixed".to_owned(),
            job_id: Some("job-fixed".to_owned()),
            description: "Demo Task assigned directly to vendor".to_owned(),
            created_at: Some(datetime!(2025-01-02 03:04:05 UTC)),
        };
        let fields = to_fields(&task).unwrap();
        assert_eq!(fields["taskId"], "task-fixed");
        assert_eq!(fields["vendorId"], "vendor-fixed");
        assert_eq!(fields["createdAt"], "2025-01-02T03:04:05Z");

        let back: Task = serde_json::from_value(Value::Object(fields)).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn created_at_is_optional_on_read() {
        let company: Company =
            serde_json::from_str(r#"{"companyId":"acme","name":"Acme"}"#).unwrap();
        assert!(company.created_at.is_none());
    }
}
