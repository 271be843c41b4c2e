//! Per-role check batteries derived from the fixture set.

use fixtures::{FixtureSet, FixtureUser, ids};
use platform_sdk::Query;
use serde_json::{Map, Value};
use tenantdash_security::{
    AccessPolicy, BlobPath, CollectionRef, DocPath, Role, ScopedKind, fields,
};

use crate::error::RuleCheckError;

/// Phases of one role run, executed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckPhase {
    PositiveReads,
    Storage,
    NegativeReads,
    NegativeWrites,
}

impl CheckPhase {
    pub const ORDER: [CheckPhase; 4] = [
        CheckPhase::PositiveReads,
        CheckPhase::Storage,
        CheckPhase::NegativeReads,
        CheckPhase::NegativeWrites,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckPhase::PositiveReads => "positive-reads",
            CheckPhase::Storage => "storage",
            CheckPhase::NegativeReads => "negative-reads",
            CheckPhase::NegativeWrites => "negative-writes",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Probe {
    /// The document must be readable and its stable fields must equal `expect`.
    Get {
        path: DocPath,
        expect: Map<String, Value>,
    },
    /// The query must succeed; with `expect_ids`, return exactly those ids.
    List {
        query: Query,
        expect_ids: Option<Vec<String>>,
    },
    /// Upload, read back and delete an object.
    StorageRoundTrip(BlobPath),
    DenyGet(DocPath),
    DenyList(Query),
    DenyUpload(BlobPath),
    DenyWrite {
        path: DocPath,
        fields: Map<String, Value>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub phase: CheckPhase,
    pub name: String,
    pub probe: Probe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleBattery {
    pub role: Role,
    pub email: String,
    pub password: String,
    pub checks: Vec<Check>,
}

impl RoleBattery {
    fn new(user: &FixtureUser) -> Self {
        Self {
            role: user.role,
            email: user.email.clone(),
            password: user.password.clone(),
            checks: Vec::new(),
        }
    }

    fn push(&mut self, phase: CheckPhase, name: impl Into<String>, probe: Probe) {
        self.checks.push(Check {
            phase,
            name: name.into(),
            probe,
        });
    }

    /// Checks of `phase`, in insertion order.
    pub fn phase(&self, phase: CheckPhase) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(move |c| c.phase == phase)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleCheckPlan {
    pub batteries: Vec<RoleBattery>,
}

/// Fields stamped at seed time. A later seed run rewrites them, so reads ignore them.
pub const VOLATILE_FIELDS: &[&str] = &["createdAt"];

/// `fields` without [`VOLATILE_FIELDS`].
#[must_use]
pub fn stable_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(k, _)| !VOLATILE_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn list(query: Query) -> Probe {
    Probe::List {
        query,
        expect_ids: None,
    }
}

struct Paths<'a> {
    set: &'a FixtureSet,
    cid: &'a str,
    other: &'a str,
}

impl Paths<'_> {
    /// A read of a seeded document, expecting its seeded fields back.
    fn read(&self, path: DocPath) -> Result<Probe, RuleCheckError> {
        let doc = self
            .set
            .document(&path)
            .ok_or_else(|| RuleCheckError::MissingFixture(path.to_string()))?;
        Ok(Probe::Get {
            expect: stable_fields(&doc.fields),
            path,
        })
    }

    fn home(&self, kind: ScopedKind, id: &str) -> DocPath {
        DocPath::scoped(self.cid, kind, id)
    }

    fn foreign(&self, kind: ScopedKind, id: &str) -> DocPath {
        DocPath::scoped(self.other, kind, id)
    }

    fn home_list(&self, kind: ScopedKind) -> Query {
        Query::new(CollectionRef::scoped(self.cid, kind))
    }
}

impl RuleCheckPlan {
    pub fn from_fixtures(set: &FixtureSet, policy: &AccessPolicy) -> Result<Self, RuleCheckError> {
        let config = &set.config;
        let paths = Paths {
            set,
            cid: &config.company_id,
            other: &config.other_company_id,
        };
        let negatives = config.include_negative_fixtures;
        let vendor_uid = config.roles.vendor.as_str();

        let mut batteries = Vec::new();
        for user in &set.users {
            let mut b = RoleBattery::new(user);
            match user.role {
                Role::SuperAdmin => {
                    Self::staff_reads(&mut b, &paths, vendor_uid)?;
                    b.push(
                        CheckPhase::PositiveReads,
                        "list tasks",
                        list(paths.home_list(ScopedKind::Tasks)),
                    );
                    b.push(
                        CheckPhase::PositiveReads,
                        "get share",
                        paths.read(paths.home(ScopedKind::Shares, ids::SHARE))?,
                    );
                    b.push(
                        CheckPhase::PositiveReads,
                        "list companies",
                        list(Query::new(CollectionRef::Companies)),
                    );
                    b.push(
                        CheckPhase::PositiveReads,
                        "list users",
                        list(Query::new(CollectionRef::Users)),
                    );
                    if negatives {
                        b.push(
                            CheckPhase::PositiveReads,
                            "get other company's task",
                            paths.read(paths.foreign(ScopedKind::Tasks, ids::OTHER_COMPANY_TASK))?,
                        );
                    }
                    b.push(
                        CheckPhase::Storage,
                        "company file round trip",
                        Probe::StorageRoundTrip(BlobPath::company_file(paths.cid, "test-super.txt")?),
                    );
                }
                Role::Admin => {
                    Self::staff_reads(&mut b, &paths, vendor_uid)?;
                    b.push(
                        CheckPhase::PositiveReads,
                        "list company users",
                        list(
                            Query::new(CollectionRef::Users)
                                .where_eq(fields::COMPANY_ID, paths.cid),
                        ),
                    );
                    b.push(
                        CheckPhase::Storage,
                        "company file round trip",
                        Probe::StorageRoundTrip(BlobPath::company_file(paths.cid, "test-admin.txt")?),
                    );
                    if negatives {
                        for (kind, id) in [
                            (ScopedKind::Jobs, ids::OTHER_COMPANY_JOB),
                            (ScopedKind::Tasks, ids::OTHER_COMPANY_TASK),
                            (ScopedKind::Shares, ids::OTHER_COMPANY_SHARE),
                        ] {
                            b.push(
                                CheckPhase::NegativeReads,
                                format!("get other company's {kind}"),
                                Probe::DenyGet(paths.foreign(kind, id)),
                            );
                        }
                    }
                    b.push(
                        CheckPhase::NegativeReads,
                        "list other company's tasks",
                        Probe::DenyList(Query::new(CollectionRef::scoped(
                            paths.other,
                            ScopedKind::Tasks,
                        ))),
                    );
                    b.push(
                        CheckPhase::NegativeWrites,
                        "upload to other company's files",
                        Probe::DenyUpload(BlobPath::company_file(paths.other, "forbidden.txt")?),
                    );
                    b.push(
                        CheckPhase::NegativeWrites,
                        "write task into other company",
                        Probe::DenyWrite {
                            path: paths.foreign(ScopedKind::Tasks, "forbidden-task"),
                            fields: forbidden_fields(paths.other, vendor_uid),
                        },
                    );
                }
                Role::Vendor => {
                    Self::vendor_battery(&mut b, &paths, vendor_uid, policy, negatives)?;
                }
            }
            batteries.push(b);
        }
        Ok(Self { batteries })
    }

    /// Reads every staff role must be able to make in the home company.
    fn staff_reads(b: &mut RoleBattery, paths: &Paths<'_>, vendor_uid: &str) -> Result<(), RuleCheckError> {
        b.push(
            CheckPhase::PositiveReads,
            "get vendor profile",
            paths.read(paths.home(ScopedKind::Vendors, vendor_uid))?,
        );
        b.push(
            CheckPhase::PositiveReads,
            "get job",
            paths.read(paths.home(ScopedKind::Jobs, ids::JOB))?,
        );
        b.push(
            CheckPhase::PositiveReads,
            "list jobs",
            list(paths.home_list(ScopedKind::Jobs)),
        );
        b.push(
            CheckPhase::PositiveReads,
            "get task",
            paths.read(paths.home(ScopedKind::Tasks, ids::TASK))?,
        );
        b.push(
            CheckPhase::PositiveReads,
            "list shares",
            list(paths.home_list(ScopedKind::Shares)),
        );
        Ok(())
    }

    fn vendor_battery(
        b: &mut RoleBattery,
        paths: &Paths<'_>,
        vendor_uid: &str,
        policy: &AccessPolicy,
        negatives: bool,
    ) -> Result<(), RuleCheckError> {
        let own = |q: Query| q.where_eq(fields::VENDOR_ID, vendor_uid);
        let jobs = if policy.vendor_jobs_filtered() {
            own(paths.home_list(ScopedKind::Jobs))
        } else {
            paths.home_list(ScopedKind::Jobs)
        };

        b.push(
            CheckPhase::PositiveReads,
            "get own vendor profile",
            paths.read(paths.home(ScopedKind::Vendors, vendor_uid))?,
        );
        b.push(
            CheckPhase::PositiveReads,
            "get job",
            paths.read(paths.home(ScopedKind::Jobs, ids::JOB))?,
        );
        b.push(CheckPhase::PositiveReads, "list jobs", list(jobs));
        b.push(
            CheckPhase::PositiveReads,
            "get task",
            paths.read(paths.home(ScopedKind::Tasks, ids::TASK))?,
        );
        b.push(
            CheckPhase::PositiveReads,
            "list own tasks",
            Probe::List {
                query: own(paths.home_list(ScopedKind::Tasks)),
                expect_ids: Some(vec![ids::TASK.to_owned()]),
            },
        );
        b.push(
            CheckPhase::PositiveReads,
            "list own shares",
            list(own(paths.home_list(ScopedKind::Shares))),
        );
        b.push(
            CheckPhase::Storage,
            "own share folder round trip",
            Probe::StorageRoundTrip(BlobPath::vendor_share(paths.cid, vendor_uid, "test-vendor.txt")?),
        );

        if negatives {
            b.push(
                CheckPhase::NegativeReads,
                "get other vendor's task",
                Probe::DenyGet(paths.home(ScopedKind::Tasks, ids::OTHER_VENDOR_TASK)),
            );
            b.push(
                CheckPhase::NegativeReads,
                "get other vendor's share",
                Probe::DenyGet(paths.home(ScopedKind::Shares, ids::OTHER_VENDOR_SHARE)),
            );
            b.push(
                CheckPhase::NegativeReads,
                "get other company's task",
                Probe::DenyGet(paths.foreign(ScopedKind::Tasks, ids::OTHER_COMPANY_TASK)),
            );
            let other_vendor_job = paths.home(ScopedKind::Jobs, ids::OTHER_VENDOR_JOB);
            if policy.vendor_jobs_filtered() {
                b.push(
                    CheckPhase::NegativeReads,
                    "get other vendor's job",
                    Probe::DenyGet(other_vendor_job),
                );
            } else {
                b.push(
                    CheckPhase::PositiveReads,
                    "get other vendor's job (company-wide jobs)",
                    paths.read(other_vendor_job)?,
                );
            }
        }
        b.push(
            CheckPhase::NegativeReads,
            "list tasks without vendor filter",
            Probe::DenyList(paths.home_list(ScopedKind::Tasks)),
        );

        b.push(
            CheckPhase::NegativeWrites,
            "upload to another vendor's share folder",
            Probe::DenyUpload(BlobPath::vendor_share(paths.cid, "someOtherVendor", "forbidden.txt")?),
        );
        b.push(
            CheckPhase::NegativeWrites,
            "upload to company files",
            Probe::DenyUpload(BlobPath::company_file(paths.cid, "forbidden.txt")?),
        );
        b.push(
            CheckPhase::NegativeWrites,
            "write task",
            Probe::DenyWrite {
                path: paths.home(ScopedKind::Tasks, "vendor-written-task"),
                fields: forbidden_fields(paths.cid, vendor_uid),
            },
        );
        Ok(())
    }
}

fn forbidden_fields(company_id: &str, vendor_id: &str) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert(fields::COMPANY_ID.to_owned(), Value::from(company_id));
    doc.insert(fields::VENDOR_ID.to_owned(), Value::from(vendor_id));
    doc.insert("description".to_owned(), Value::from("forbidden"));
    doc
}
