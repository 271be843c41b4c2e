//! Destructive wipe helpers. Callers are expected to confirm first.

use platform_sdk::{BlobClient, DocumentClient, IdentityClient};
use tenantdash_security::SecurityContext;

use crate::error::SeedError;

/// Page size for identity deletion.
pub const USER_PAGE_SIZE: usize = 1000;

/// Delete every document, including orphaned company subtrees.
pub async fn nuke_documents<P: DocumentClient + ?Sized>(platform: &P) -> Result<usize, SeedError> {
    let ctx = SecurityContext::service();
    let paths = platform
        .list_paths(&ctx)
        .await
        .map_err(|e| SeedError::platform("list documents", "*", e))?;
    for path in &paths {
        platform
            .delete(&ctx, path)
            .await
            .map_err(|e| SeedError::platform("delete document", path.to_string(), e))?;
        tracing::debug!(path = %path, "document deleted");
    }
    tracing::info!(count = paths.len(), "document store wiped");
    Ok(paths.len())
}

/// Delete every object in the bucket.
pub async fn nuke_blobs<P: BlobClient + ?Sized>(platform: &P) -> Result<usize, SeedError> {
    let ctx = SecurityContext::service();
    let paths = platform
        .list(&ctx, "")
        .await
        .map_err(|e| SeedError::platform("list objects", "*", e))?;
    if paths.is_empty() {
        tracing::info!("no objects found in bucket");
    }
    for path in &paths {
        platform
            .delete_object(&ctx, path)
            .await
            .map_err(|e| SeedError::platform("delete object", path.to_string(), e))?;
        tracing::debug!(path = %path, "object deleted");
    }
    tracing::info!(count = paths.len(), "blob store wiped");
    Ok(paths.len())
}

/// Delete every identity, one page at a time.
pub async fn nuke_users<P: IdentityClient + ?Sized>(platform: &P) -> Result<usize, SeedError> {
    let ctx = SecurityContext::service();
    let mut deleted = 0;
    let mut page_token: Option<String> = None;
    loop {
        let page = platform
            .list_users(&ctx, USER_PAGE_SIZE, page_token.as_deref())
            .await
            .map_err(|e| SeedError::platform("list users", "*", e))?;
        for user in &page.users {
            platform
                .delete_user(&ctx, &user.uid)
                .await
                .map_err(|e| SeedError::platform("delete user", user.uid.clone(), e))?;
            tracing::debug!(uid = %user.uid, email = %user.email, "user deleted");
            deleted += 1;
        }
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }
    tracing::info!(count = deleted, "identities wiped");
    Ok(deleted)
}
