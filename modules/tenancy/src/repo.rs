use std::sync::Arc;

use platform_sdk::{Document, DocumentClient, Query};
use serde::de::DeserializeOwned;
use tenantdash_security::{
    AccessPolicy, CollectionRef, DocPath, Role, ScopedKind, SecurityContext, fields,
};

use crate::error::RepoError;
use crate::model::{
    Company, FileRecord, Job, Record, ScopedEntity, Share, Task, UserProfile, VendorProfile,
    to_fields,
};

/// Role-scoped reads over the document store.
///
/// List operations always add the narrowest filters the caller's claims allow, so a
/// vendor never issues a query the rule set would reject as a whole.
pub struct TenancyRepo<P: DocumentClient + ?Sized> {
    client: Arc<P>,
    policy: AccessPolicy,
}

impl<P: DocumentClient + ?Sized> Clone for TenancyRepo<P> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            policy: self.policy.clone(),
        }
    }
}

fn unrestricted(ctx: &SecurityContext) -> bool {
    ctx.is_service() || ctx.role() == Some(Role::SuperAdmin)
}

fn record<T: DeserializeOwned>(doc: &Document) -> Result<Record<T>, RepoError> {
    Ok(Record {
        id: doc.id().to_owned(),
        data: doc.decode()?,
    })
}

impl<P: DocumentClient + ?Sized> TenancyRepo<P> {
    pub fn new(client: Arc<P>, policy: AccessPolicy) -> Self {
        Self { client, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Query for `kind` under `company_id`, narrowed to the caller's vendor id where
    /// the rules require it.
    #[must_use]
    pub fn scoped_query(&self, ctx: &SecurityContext, company_id: &str, kind: ScopedKind) -> Query {
        let query = Query::new(CollectionRef::scoped(company_id, kind));
        match ctx.vendor_scope() {
            Some(uid) if kind != ScopedKind::Jobs || self.policy.vendor_jobs_filtered() => {
                query.where_eq(fields::VENDOR_ID, uid)
            }
            _ => query,
        }
    }

    /// Query over a top-level collection, narrowed to the caller's company unless the
    /// caller sees everything.
    fn tenant_query(&self, ctx: &SecurityContext, collection: CollectionRef) -> Result<Query, RepoError> {
        let query = Query::new(collection);
        if unrestricted(ctx) {
            return Ok(query);
        }
        let company_id = ctx.company_id().ok_or(RepoError::MissingCompany)?;
        Ok(query.where_eq(fields::COMPANY_ID, company_id))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
    ) -> Result<Option<Record<T>>, RepoError> {
        match self.client.get(ctx, path).await? {
            Some(doc) => record(&doc).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        ctx: &SecurityContext,
        query: &Query,
    ) -> Result<Vec<Record<T>>, RepoError> {
        let docs = self.client.query(ctx, query).await.inspect_err(|e| {
            tracing::debug!(
                principal = %ctx.describe(),
                collection = %query.collection,
                code = e.code(),
                "query rejected"
            );
        })?;
        tracing::debug!(
            principal = %ctx.describe(),
            collection = %query.collection,
            filters = query.filters.len(),
            results = docs.len(),
            "query"
        );
        docs.iter().map(record).collect()
    }

    pub async fn company(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Option<Record<Company>>, RepoError> {
        self.fetch(ctx, &DocPath::company(company_id)).await
    }

    pub async fn companies(&self, ctx: &SecurityContext) -> Result<Vec<Record<Company>>, RepoError> {
        let query = self.tenant_query(ctx, CollectionRef::Companies)?;
        self.fetch_all(ctx, &query).await
    }

    pub async fn user_profile(
        &self,
        ctx: &SecurityContext,
        uid: &str,
    ) -> Result<Option<Record<UserProfile>>, RepoError> {
        self.fetch(ctx, &DocPath::user(uid)).await
    }

    pub async fn users(&self, ctx: &SecurityContext) -> Result<Vec<Record<UserProfile>>, RepoError> {
        let query = self.tenant_query(ctx, CollectionRef::Users)?;
        self.fetch_all(ctx, &query).await
    }

    pub async fn get_scoped<T: ScopedEntity>(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        id: &str,
    ) -> Result<Option<Record<T>>, RepoError> {
        self.fetch(ctx, &DocPath::scoped(company_id, T::KIND, id))
            .await
    }

    pub async fn list_scoped<T: ScopedEntity>(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Vec<Record<T>>, RepoError> {
        let query = self.scoped_query(ctx, company_id, T::KIND);
        self.fetch_all(ctx, &query).await
    }

    /// Create or overwrite a company-scoped entity.
    pub async fn put_scoped<T: ScopedEntity + Sync>(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        id: &str,
        entity: &T,
    ) -> Result<(), RepoError> {
        let fields = to_fields(entity)?;
        self.client
            .set(ctx, &DocPath::scoped(company_id, T::KIND, id), fields)
            .await?;
        Ok(())
    }

    pub async fn vendor(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        vendor_id: &str,
    ) -> Result<Option<Record<VendorProfile>>, RepoError> {
        self.get_scoped(ctx, company_id, vendor_id).await
    }

    pub async fn vendors(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Vec<Record<VendorProfile>>, RepoError> {
        self.list_scoped(ctx, company_id).await
    }

    pub async fn job(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        job_id: &str,
    ) -> Result<Option<Record<Job>>, RepoError> {
        self.get_scoped(ctx, company_id, job_id).await
    }

    pub async fn jobs(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Vec<Record<Job>>, RepoError> {
        self.list_scoped(ctx, company_id).await
    }

    pub async fn task(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        task_id: &str,
    ) -> Result<Option<Record<Task>>, RepoError> {
        self.get_scoped(ctx, company_id, task_id).await
    }

    pub async fn tasks(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Vec<Record<Task>>, RepoError> {
        self.list_scoped(ctx, company_id).await
    }

    pub async fn share(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        share_id: &str,
    ) -> Result<Option<Record<Share>>, RepoError> {
        self.get_scoped(ctx, company_id, share_id).await
    }

    pub async fn shares(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Vec<Record<Share>>, RepoError> {
        self.list_scoped(ctx, company_id).await
    }

    pub async fn file(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
        file_id: &str,
    ) -> Result<Option<Record<FileRecord>>, RepoError> {
        self.get_scoped(ctx, company_id, file_id).await
    }

    pub async fn files(
        &self,
        ctx: &SecurityContext,
        company_id: &str,
    ) -> Result<Vec<Record<FileRecord>>, RepoError> {
        self.list_scoped(ctx, company_id).await
    }
}
