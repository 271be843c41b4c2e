use std::ops::Bound;

use async_trait::async_trait;
use parking_lot::RwLock;
use platform_sdk::{
    BlobClient, CustomClaims, Document, DocumentClient, IdTokenClaims, IdentityClient, NewUser,
    PlatformError, Query, Session, UserPage,
};
use serde_json::{Map, Value};
use tenantdash_security::{AccessPolicy, BlobOp, BlobPath, DocPath, RuleEngine, SecurityContext};

use crate::config::LocalPlatformConfig;
use crate::password::PasswordDigest;
use crate::state::{State, StoredBlob, StoredUser};
use crate::token::TokenIssuer;

/// Upper bound for one page of `list_users`.
pub const MAX_PAGE_SIZE: usize = 1000;

const MIN_PASSWORD_LEN: usize = 6;

/// In-process platform.
///
/// Identity, documents and blobs live behind one lock; every client call is checked
/// against the shared [`RuleEngine`] before it touches state. With a `state_path`
/// configured, each mutation is flushed to disk before the call returns.
pub struct LocalPlatform {
    config: LocalPlatformConfig,
    rules: RuleEngine,
    tokens: TokenIssuer,
    state: RwLock<State>,
}

fn require_service(ctx: &SecurityContext, op: &str) -> Result<(), PlatformError> {
    if ctx.is_service() {
        Ok(())
    } else {
        tracing::warn!(principal = %ctx.describe(), op, "administrative call without service credentials");
        Err(PlatformError::PermissionDenied {
            reason: format!("{op} requires service credentials"),
        })
    }
}

impl LocalPlatform {
    /// Open the platform, loading the snapshot at `config.state_path` if present.
    pub fn open(config: LocalPlatformConfig, policy: AccessPolicy) -> Result<Self, PlatformError> {
        let state = match &config.state_path {
            Some(path) => State::load(path)?,
            None => State::default(),
        };
        tracing::info!(
            project_id = %config.project_id,
            bucket = %config.storage_bucket,
            state_path = ?config.state_path,
            users = state.users.len(),
            documents = state.documents.len(),
            blobs = state.blobs.len(),
            "local platform opened"
        );
        Ok(Self {
            tokens: TokenIssuer::new(&config),
            rules: RuleEngine::new(policy),
            config,
            state: RwLock::new(state),
        })
    }

    /// Fresh platform with default settings and no persistence.
    #[must_use]
    pub fn in_memory(policy: AccessPolicy) -> Self {
        let config = LocalPlatformConfig::default();
        Self {
            tokens: TokenIssuer::new(&config),
            rules: RuleEngine::new(policy),
            config,
            state: RwLock::new(State::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LocalPlatformConfig {
        &self.config
    }

    #[must_use]
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, PlatformError>,
    ) -> Result<R, PlatformError> {
        let mut state = self.state.write();
        let Some(path) = &self.config.state_path else {
            return f(&mut state);
        };
        // The snapshot is written with blocking I/O under the write lock so that
        // writes land in mutation order. A failed write leaves memory untouched.
        let mut next = state.clone();
        let out = f(&mut next)?;
        next.save(path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "failed to persist platform state");
        })?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl IdentityClient for LocalPlatform {
    async fn create_user(&self, ctx: &SecurityContext, user: NewUser) -> Result<(), PlatformError> {
        require_service(ctx, "create_user")?;
        if user.uid.is_empty() || user.uid.contains('/') {
            return Err(PlatformError::InvalidArgument(format!(
                "invalid uid '{}'",
                user.uid
            )));
        }
        if !user.email.contains('@') {
            return Err(PlatformError::InvalidArgument(format!(
                "invalid email '{}'",
                user.email
            )));
        }
        if user.password.len() < MIN_PASSWORD_LEN {
            return Err(PlatformError::InvalidArgument(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        self.mutate(|state| {
            if state.users.contains_key(&user.uid) {
                return Err(PlatformError::UidAlreadyExists { uid: user.uid });
            }
            if state.user_by_email(&user.email).is_some() {
                return Err(PlatformError::EmailAlreadyExists { email: user.email });
            }
            tracing::debug!(uid = %user.uid, email = %user.email, "user created");
            state.users.insert(
                user.uid.clone(),
                StoredUser {
                    password: PasswordDigest::new(&user.password),
                    uid: user.uid,
                    email: user.email,
                    display_name: user.display_name,
                    custom_claims: CustomClaims::default(),
                },
            );
            Ok(())
        })
    }

    async fn set_custom_claims(
        &self,
        ctx: &SecurityContext,
        uid: &str,
        claims: CustomClaims,
    ) -> Result<(), PlatformError> {
        require_service(ctx, "set_custom_claims")?;
        self.mutate(|state| {
            let user = state
                .users
                .get_mut(uid)
                .ok_or_else(|| PlatformError::UserNotFound {
                    uid: uid.to_owned(),
                })?;
            tracing::debug!(uid, role = ?claims.role, company_id = ?claims.company_id, "custom claims set");
            user.custom_claims = claims;
            Ok(())
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, PlatformError> {
        let state = self.state.read();
        let user = state
            .user_by_email(email)
            .filter(|u| u.password.verify(password))
            .ok_or(PlatformError::InvalidCredential)?;
        let id_token = self.tokens.issue(user)?;
        tracing::debug!(uid = %user.uid, "signed in");
        Ok(Session {
            id_token,
            claims: user.record().claims(),
        })
    }

    async fn verify_id_token(&self, token: &str) -> Result<IdTokenClaims, PlatformError> {
        self.tokens.verify(token)
    }

    async fn list_users(
        &self,
        ctx: &SecurityContext,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<UserPage, PlatformError> {
        require_service(ctx, "list_users")?;
        let limit = max_results.clamp(1, MAX_PAGE_SIZE);
        let state = self.state.read();
        let lower = match page_token {
            Some(token) => Bound::Excluded(token.to_owned()),
            None => Bound::Unbounded,
        };
        let mut iter = state
            .users
            .range((lower, Bound::Unbounded))
            .map(|(_, u)| u.record());
        let users: Vec<_> = iter.by_ref().take(limit).collect();
        let next_page_token = if iter.next().is_some() {
            users.last().map(|u| u.uid.clone())
        } else {
            None
        };
        Ok(UserPage {
            users,
            next_page_token,
        })
    }

    async fn delete_user(&self, ctx: &SecurityContext, uid: &str) -> Result<(), PlatformError> {
        require_service(ctx, "delete_user")?;
        self.mutate(|state| {
            state
                .users
                .remove(uid)
                .map(|_| ())
                .ok_or_else(|| PlatformError::UserNotFound {
                    uid: uid.to_owned(),
                })
        })
    }
}

#[async_trait]
impl DocumentClient for LocalPlatform {
    async fn get(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
    ) -> Result<Option<Document>, PlatformError> {
        let state = self.state.read();
        let fields = state.documents.get(path);
        self.rules
            .authorize_get(ctx, path, fields)
            .map_err(PlatformError::from_document_access)?;
        Ok(fields.map(|fields| Document {
            path: path.clone(),
            fields: fields.clone(),
        }))
    }

    async fn query(
        &self,
        ctx: &SecurityContext,
        query: &Query,
    ) -> Result<Vec<Document>, PlatformError> {
        self.rules
            .authorize_query(ctx, &query.collection, &query.filters)
            .map_err(PlatformError::from_document_access)?;
        let state = self.state.read();
        Ok(state
            .documents
            .iter()
            .map(|(path, fields)| Document {
                path: path.clone(),
                fields: fields.clone(),
            })
            .filter(|doc| query.matches(doc))
            .collect())
    }

    async fn set(
        &self,
        ctx: &SecurityContext,
        path: &DocPath,
        fields: Map<String, Value>,
    ) -> Result<(), PlatformError> {
        self.rules
            .authorize_write(ctx, path, &fields)
            .map_err(PlatformError::from_document_access)?;
        self.mutate(|state| {
            state.documents.insert(path.clone(), fields);
            Ok(())
        })
    }

    async fn delete(&self, ctx: &SecurityContext, path: &DocPath) -> Result<(), PlatformError> {
        self.rules
            .authorize_delete(ctx, path)
            .map_err(PlatformError::from_document_access)?;
        self.mutate(|state| {
            state.documents.remove(path);
            Ok(())
        })
    }

    async fn list_paths(&self, ctx: &SecurityContext) -> Result<Vec<DocPath>, PlatformError> {
        require_service(ctx, "list_paths")?;
        Ok(self.state.read().documents.keys().cloned().collect())
    }
}

#[async_trait]
impl BlobClient for LocalPlatform {
    async fn upload(
        &self,
        ctx: &SecurityContext,
        path: &BlobPath,
        bytes: Vec<u8>,
    ) -> Result<(), PlatformError> {
        self.rules
            .authorize_blob(ctx, path, BlobOp::Write)
            .map_err(|e| PlatformError::from_blob_access(e, path.as_str()))?;
        self.mutate(|state| {
            tracing::debug!(path = %path, size = bytes.len(), "object uploaded");
            state.blobs.insert(path.clone(), StoredBlob { bytes });
            Ok(())
        })
    }

    async fn download(
        &self,
        ctx: &SecurityContext,
        path: &BlobPath,
    ) -> Result<Vec<u8>, PlatformError> {
        self.rules
            .authorize_blob(ctx, path, BlobOp::Read)
            .map_err(|e| PlatformError::from_blob_access(e, path.as_str()))?;
        let state = self.state.read();
        state
            .blobs
            .get(path)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| PlatformError::ObjectNotFound {
                path: path.to_string(),
            })
    }

    async fn delete_object(
        &self,
        ctx: &SecurityContext,
        path: &BlobPath,
    ) -> Result<(), PlatformError> {
        self.rules
            .authorize_blob(ctx, path, BlobOp::Delete)
            .map_err(|e| PlatformError::from_blob_access(e, path.as_str()))?;
        self.mutate(|state| {
            state
                .blobs
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| PlatformError::ObjectNotFound {
                    path: path.to_string(),
                })
        })
    }

    async fn list(
        &self,
        ctx: &SecurityContext,
        prefix: &str,
    ) -> Result<Vec<BlobPath>, PlatformError> {
        self.rules
            .authorize_blob_list(ctx, prefix)
            .map_err(|e| PlatformError::from_blob_access(e, prefix))?;
        let state = self.state.read();
        Ok(state
            .blobs
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect())
    }
}
