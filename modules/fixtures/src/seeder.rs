use std::sync::Arc;

use platform_sdk::{CustomClaims, NewUser, PlatformClient};
use tenantdash_security::SecurityContext;

use crate::error::SeedError;
use crate::set::{FixtureSet, FixtureUser};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub users_existing: usize,
    pub documents_written: usize,
    pub blobs_uploaded: usize,
}

/// Writes a [`FixtureSet`] through the administrative platform API.
///
/// Seeding is idempotent: existing identities are kept and their claims reassigned,
/// documents and objects are overwritten in place.
pub struct Seeder<P: PlatformClient + ?Sized> {
    platform: Arc<P>,
    ctx: SecurityContext,
}

impl<P: PlatformClient + ?Sized> Seeder<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self {
            platform,
            ctx: SecurityContext::service(),
        }
    }

    pub async fn seed(&self, set: &FixtureSet) -> Result<SeedReport, SeedError> {
        tracing::info!(company_id = %set.company_id(), "starting seed");
        let mut report = SeedReport::default();

        for user in &set.users {
            if self.ensure_user(user).await? {
                report.users_created += 1;
            } else {
                report.users_existing += 1;
            }
            self.assign(user).await?;
        }

        for doc in &set.documents {
            self.platform
                .set(&self.ctx, &doc.path, doc.fields.clone())
                .await
                .map_err(|e| SeedError::platform("set document", doc.path.to_string(), e))?;
            tracing::debug!(path = %doc.path, "document seeded");
            report.documents_written += 1;
        }

        for blob in &set.blobs {
            self.platform
                .upload(&self.ctx, &blob.path, blob.bytes.clone())
                .await
                .map_err(|e| SeedError::platform("upload", blob.path.to_string(), e))?;
            tracing::debug!(path = %blob.path, size = blob.bytes.len(), "object seeded");
            report.blobs_uploaded += 1;
        }

        tracing::info!(
            users_created = report.users_created,
            users_existing = report.users_existing,
            documents = report.documents_written,
            blobs = report.blobs_uploaded,
            "seeding complete"
        );
        Ok(report)
    }

    /// Reassign `{role, companyId}` claims to the fixture role accounts only.
    pub async fn assign_claims(&self, set: &FixtureSet) -> Result<usize, SeedError> {
        for user in &set.users {
            self.assign(user).await?;
        }
        Ok(set.users.len())
    }

    /// `true` when the identity was created, `false` when it already existed.
    async fn ensure_user(&self, user: &FixtureUser) -> Result<bool, SeedError> {
        let new_user = NewUser {
            uid: user.uid.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            display_name: Some(user.role.as_str().to_owned()),
        };
        match self.platform.create_user(&self.ctx, new_user).await {
            Ok(()) => {
                tracing::info!(uid = %user.uid, email = %user.email, "user created");
                Ok(true)
            }
            Err(e) if e.is_already_exists() => {
                tracing::info!(uid = %user.uid, code = e.code(), "user already exists, skipping");
                Ok(false)
            }
            Err(e) => Err(SeedError::platform("create user", user.uid.clone(), e)),
        }
    }

    async fn assign(&self, user: &FixtureUser) -> Result<(), SeedError> {
        self.platform
            .set_custom_claims(
                &self.ctx,
                &user.uid,
                CustomClaims::new(user.role, user.company_id.clone()),
            )
            .await
            .map_err(|e| SeedError::platform("set claims", user.uid.clone(), e))?;
        tracing::info!(uid = %user.uid, role = %user.role, company_id = %user.company_id, "claims set");
        Ok(())
    }
}
