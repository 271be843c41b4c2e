//! Client traits for the backing platform.
//!
//! Every call takes the caller's [`SecurityContext`]. Administrative tooling passes
//! [`SecurityContext::service`], which bypasses the access rules; end-user calls pass
//! the context of their [`crate::Session`] and are checked against the rule set.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tenantdash_security::{BlobPath, DocPath, SecurityContext};

use crate::error::PlatformError;
use crate::models::{CustomClaims, Document, IdTokenClaims, NewUser, Query, Session, UserPage};

/// Email/password identity provider with custom claims.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Create an identity. Administrative.
    ///
    /// # Errors
    ///
    /// - `UidAlreadyExists` / `EmailAlreadyExists` when either key is taken
    async fn create_user(
        &self,
        ctx: &SecurityContext,
        user: NewUser,
    ) -> Result<(), PlatformError>;

    /// Replace the custom claims of `uid`. Administrative.
    ///
    /// Tokens issued afterwards carry the new claims; tokens already issued do not.
    async fn set_custom_claims(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        claims: CustomClaims,
    ) -> Result<(), PlatformError>;

    /// Exchange an email/password pair for a signed session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, PlatformError>;

    /// Check the signature, audience, issuer and expiry of an ID token.
    async fn verify_id_token(&self, token: &str) -> Result<IdTokenClaims, PlatformError>;

    /// List identities in uid order. Administrative.
    ///
    /// `page_token` is the value returned in the previous page's `next_page_token`.
    async fn list_users(
        &self,
        ctx: &SecurityContext,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<UserPage, PlatformError>;

    /// Administrative.
    async fn delete_user(&self, ctx: &SecurityContext, uid: &str) -> Result<(), PlatformError>;
}

/// Hierarchical document store.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// `Ok(None)` when the document is absent and the caller may observe that.
    async fn get(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
    ) -> Result<Option<Document>, PlatformError>;

    /// Documents of one collection matching every filter, ordered by id.
    ///
    /// A query the caller is not entitled to run fails as a whole; it never
    /// degrades to a partial result.
    async fn query(
        &self,
        ctx: &SecurityContext,
        query: &Query,
    ) -> Result<Vec<Document>, PlatformError>;

    /// Create or overwrite.
    async fn set(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
        fields: Map<String, Value>,
    ) -> Result<(), PlatformError>;

    /// Deleting an absent document is not an error.
    async fn delete(&self, ctx: &SecurityContext, path: &DocPath) -> Result<(), PlatformError>;

    /// Every stored document path, including subtrees whose company document is
    /// gone. Administrative.
    async fn list_paths(&self, ctx: &SecurityContext) -> Result<Vec<DocPath>, PlatformError>;
}

/// Path-addressed object store.
#[async_trait]
pub trait BlobClient: Send + Sync {
    async fn upload(
        &self,
        ctx: &SecurityContext,
        path: &BlobPath,
        bytes: Vec<u8>,
    ) -> Result<(), PlatformError>;

    async fn download(&self, ctx: &SecurityContext, path: &BlobPath)
    -> Result<Vec<u8>, PlatformError>;

    /// # Errors
    ///
    /// - `ObjectNotFound` when nothing is stored at `path`
    async fn delete_object(
        &self,
        ctx: &SecurityContext,
        path: &BlobPath,
    ) -> Result<(), PlatformError>;

    /// Objects whose path starts with `prefix`, in path order.
    async fn list(
        &self,
        ctx: &SecurityContext,
        prefix: &str,
    ) -> Result<Vec<BlobPath>, PlatformError>;
}

/// A complete platform: identity, documents and blobs behind one handle.
pub trait PlatformClient: IdentityClient + DocumentClient + BlobClient {}

impl<T> PlatformClient for T where T: IdentityClient + DocumentClient + BlobClient {}
