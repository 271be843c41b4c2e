//! The fixture set: identities, documents and objects derived from a [`FixtureConfig`].

use serde_json::{Map, Value};
use tenancy::{
    Company, FileRecord, Job, ScopedEntity, Share, Task, UserProfile, VendorProfile, to_fields,
};
use tenantdash_security::{BlobPath, DocPath, Role};
use time::OffsetDateTime;

use crate::config::FixtureConfig;
use crate::error::SeedError;

/// Fixed document ids.
pub mod ids {
    pub const JOB: &str = "job-fixed";
    pub const TASK: &str = "task-fixed";
    pub const SHARE: &str = "share-fixed";
    pub const FILE: &str = "file-fixed";

    pub const OTHER_COMPANY_JOB: &str = "other-company-job";
    pub const OTHER_COMPANY_TASK: &str = "other-company-task";
    pub const OTHER_COMPANY_SHARE: &str = "other-company-share";

    pub const OTHER_VENDOR_JOB: &str = "other-vendor-job";
    pub const OTHER_VENDOR_TASK: &str = "other-vendor-task";
    pub const OTHER_VENDOR_SHARE: &str = "other-vendor-share";
}

pub const SAMPLE_FILE_NAME: &str = "sample.pdf";
pub const SAMPLE_FILE_BYTES: &[u8] = b"Hello PDF";
pub const WELCOME_FILE_NAME: &str = "welcome.txt";
pub const WELCOME_FILE_BYTES: &[u8] = b"Welcome to your share folder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureUser {
    pub uid: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company_id: String,
}

impl FixtureUser {
    fn new(role: Role, uid: &str, company_id: &str) -> Self {
        Self {
            uid: uid.to_owned(),
            email: format!("{}@example.com", role.route_segment()),
            password: format!("{}123", role.as_str()),
            role,
            company_id: company_id.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDoc {
    pub path: DocPath,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureBlob {
    pub path: BlobPath,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSet {
    pub config: FixtureConfig,
    pub users: Vec<FixtureUser>,
    pub documents: Vec<FixtureDoc>,
    pub blobs: Vec<FixtureBlob>,
}

/// Every configured id must be a single path segment.
fn check_ids(config: &FixtureConfig) -> Result<(), SeedError> {
    for id in [
        &config.company_id,
        &config.other_company_id,
        &config.other_vendor_id,
        &config.foreign_vendor_id,
        &config.roles.super_admin,
        &config.roles.admin,
        &config.roles.vendor,
    ] {
        format!("users/{id}").parse::<DocPath>()?;
    }
    Ok(())
}

struct Builder {
    documents: Vec<FixtureDoc>,
}

impl Builder {
    fn top(&mut self, path: DocPath, entity: &impl serde::Serialize) -> Result<(), SeedError> {
        self.documents.push(FixtureDoc {
            path,
            fields: to_fields(entity)?,
        });
        Ok(())
    }

    fn scoped<T: ScopedEntity>(&mut self, company_id: &str, id: &str, entity: &T) -> Result<(), SeedError> {
        self.top(DocPath::scoped(company_id, T::KIND, id), entity)
    }
}

impl FixtureSet {
    /// Build every fixture, stamping `created_at` on all documents.
    pub fn build(config: &FixtureConfig, created_at: OffsetDateTime) -> Result<Self, SeedError> {
        check_ids(config)?;
        let cid = config.company_id.as_str();
        let vendor = config.roles.vendor.as_str();
        let at = Some(created_at);

        let users: Vec<FixtureUser> = Role::ALL
            .into_iter()
            .map(|role| FixtureUser::new(role, config.roles.uid(role), cid))
            .collect();

        let sample = BlobPath::company_file(cid, SAMPLE_FILE_NAME)?;
        let welcome = BlobPath::vendor_share(cid, vendor, WELCOME_FILE_NAME)?;

        let mut b = Builder {
            documents: Vec::new(),
        };
        b.top(
            DocPath::company(cid),
            &Company {
                company_id: cid.to_owned(),
                name: config.company_name.clone(),
                created_at: at,
            },
        )?;
        for user in &users {
            b.top(
                DocPath::user(&user.uid),
                &UserProfile {
                    email: user.email.clone(),
                    role: user.role,
                    company_id: cid.to_owned(),
                    created_at: at,
                },
            )?;
        }
        b.scoped(
            cid,
            vendor,
            &VendorProfile {
                vendor_id: vendor.to_owned(),
                company_id: cid.to_owned(),
                name: "Vendor Example".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::FILE,
            &FileRecord {
                file_path: sample.to_string(),
                company_id: cid.to_owned(),
                vendor_id: Some(vendor.to_owned()),
                uploaded_by: config.roles.super_admin.clone(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::SHARE,
            &Share {
                share_id: ids::SHARE.to_owned(),
                company_id: cid.to_owned(),
                vendor_id: vendor.to_owned(),
                file_path: welcome.to_string(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::JOB,
            &Job {
                job_id: ids::JOB.to_owned(),
                company_id: cid.to_owned(),
                vendor_id: Some(vendor.to_owned()),
                title: "Demo Job".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::TASK,
            &Task {
                task_id: ids::TASK.to_owned(),
                company_id: cid.to_owned(),
                vendor_id: vendor.to_owned(),
                job_id: Some(ids::JOB.to_owned()),
                description: "Demo Task assigned directly to vendor".to_owned(),
                created_at: at,
            },
        )?;

        if config.include_negative_fixtures {
            Self::negatives(&mut b, config, created_at)?;
        }

        Ok(Self {
            config: config.clone(),
            users,
            documents: b.documents,
            blobs: vec![
                FixtureBlob {
                    path: sample,
                    bytes: SAMPLE_FILE_BYTES.to_vec(),
                },
                FixtureBlob {
                    path: welcome,
                    bytes: WELCOME_FILE_BYTES.to_vec(),
                },
            ],
        })
    }

    fn negatives(b: &mut Builder, config: &FixtureConfig, created_at: OffsetDateTime) -> Result<(), SeedError> {
        let at = Some(created_at);
        let cid = config.company_id.as_str();
        let other = config.other_company_id.as_str();
        let foreign = config.foreign_vendor_id.as_str();
        let other_vendor = config.other_vendor_id.as_str();

        b.top(
            DocPath::company(other),
            &Company {
                company_id: other.to_owned(),
                name: "Other Company".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            other,
            ids::OTHER_COMPANY_JOB,
            &Job {
                job_id: ids::OTHER_COMPANY_JOB.to_owned(),
                company_id: other.to_owned(),
                vendor_id: Some(foreign.to_owned()),
                title: "Forbidden Job".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            other,
            ids::OTHER_COMPANY_TASK,
            &Task {
                task_id: ids::OTHER_COMPANY_TASK.to_owned(),
                company_id: other.to_owned(),
                vendor_id: foreign.to_owned(),
                job_id: Some(ids::OTHER_COMPANY_JOB.to_owned()),
                description: "Forbidden Task".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            other,
            ids::OTHER_COMPANY_SHARE,
            &Share {
                share_id: ids::OTHER_COMPANY_SHARE.to_owned(),
                company_id: other.to_owned(),
                vendor_id: foreign.to_owned(),
                file_path: BlobPath::vendor_share(other, foreign, "forbidden.txt")?.to_string(),
                created_at: at,
            },
        )?;

        b.scoped(
            cid,
            other_vendor,
            &VendorProfile {
                vendor_id: other_vendor.to_owned(),
                company_id: cid.to_owned(),
                name: "Other Vendor".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::OTHER_VENDOR_TASK,
            &Task {
                task_id: ids::OTHER_VENDOR_TASK.to_owned(),
                company_id: cid.to_owned(),
                vendor_id: other_vendor.to_owned(),
                job_id: None,
                description: "Forbidden Task for another vendor".to_owned(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::OTHER_VENDOR_SHARE,
            &Share {
                share_id: ids::OTHER_VENDOR_SHARE.to_owned(),
                company_id: cid.to_owned(),
                vendor_id: other_vendor.to_owned(),
                file_path: BlobPath::vendor_share(cid, other_vendor, "forbidden.txt")?.to_string(),
                created_at: at,
            },
        )?;
        b.scoped(
            cid,
            ids::OTHER_VENDOR_JOB,
            &Job {
                job_id: ids::OTHER_VENDOR_JOB.to_owned(),
                company_id: cid.to_owned(),
                vendor_id: Some(other_vendor.to_owned()),
                title: "Job for another vendor".to_owned(),
                created_at: at,
            },
        )
    }

    #[must_use]
    pub fn user(&self, role: Role) -> Option<&FixtureUser> {
        self.users.iter().find(|u| u.role == role)
    }

    #[must_use]
    pub fn company_id(&self) -> &str {
        &self.config.company_id
    }

    #[must_use]
    pub fn contains(&self, path: &DocPath) -> bool {
        self.document(path).is_some()
    }

    #[must_use]
    pub fn document(&self, path: &DocPath) -> Option<&FixtureDoc> {
        self.documents.iter().find(|d| &d.path == path)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tenantdash_security::ScopedKind;

    #[test]
    fn default_set_matches_canonical_ids() {
        let set = FixtureSet::build(&FixtureConfig::default(), OffsetDateTime::UNIX_EPOCH).unwrap();

        let vendor = set.user(Role::Vendor).unwrap();
        assert_eq!(vendor.email, "vendor@example.com");
        assert_eq!(vendor.password, "vendor123");
        assert_eq!(set.user(Role::SuperAdmin).unwrap().password, "superAdmin123");

        for path in [
            "companies/acme-company",
            "users/vendor-fixed",
            "companies/acme-company/vendors/vendor-fixed",
            "companies/acme-company/tasks/task-fixed",
            "companies/acme-company/tasks/other-vendor-task",
            "companies/acme-company/jobs/other-vendor-job",
            "companies/other-company/shares/other-company-share",
        ] {
            assert!(set.contains(&path.parse().unwrap()), "missing {path}");
        }

        let unique: BTreeSet<_> = set.documents.iter().map(|d| d.path.clone()).collect();
        assert_eq!(unique.len(), set.documents.len());

        let blob_paths: Vec<_> = set.blobs.iter().map(|b| b.path.to_string()).collect();
        assert_eq!(
            blob_paths,
            [
                "companies/acme-company/files/sample.pdf",
                "companies/acme-company/shares/vendor-fixed/welcome.txt"
            ]
        );
    }

    #[test]
    fn negatives_can_be_disabled() {
        let config = FixtureConfig {
            include_negative_fixtures: false,
            ..FixtureConfig::default()
        };
        let set = FixtureSet::build(&config, OffsetDateTime::UNIX_EPOCH).unwrap();
        assert!(!set.contains(&DocPath::company("other-company")));
        assert!(!set.contains(&DocPath::scoped(
            "acme-company",
            ScopedKind::Tasks,
            ids::OTHER_VENDOR_TASK
        )));
    }

    #[test]
    fn invalid_company_id_is_rejected() {
        let config = FixtureConfig {
            company_id: "acme/evil".to_owned(),
            ..FixtureConfig::default()
        };
        assert!(matches!(
            FixtureSet::build(&config, OffsetDateTime::UNIX_EPOCH),
            Err(SeedError::InvalidId(_))
        ));
    }
}
