//! Platform state and its on-disk snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use platform_sdk::{CustomClaims, PlatformError, UserRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tenantdash_security::{BlobPath, DocPath};

use crate::password::PasswordDigest;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredUser {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub password: PasswordDigest,
    #[serde(default)]
    pub custom_claims: CustomClaims,
}

impl StoredUser {
    pub(crate) fn record(&self) -> UserRecord {
        UserRecord {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            custom_claims: self.custom_claims.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredBlob {
    #[serde(with = "hex::serde")]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct State {
    pub users: BTreeMap<String, StoredUser>,
    pub documents: BTreeMap<DocPath, Map<String, Value>>,
    pub blobs: BTreeMap<BlobPath, StoredBlob>,
}

impl State {
    pub(crate) fn user_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Read a snapshot; a missing file is an empty platform.
    pub(crate) fn load(path: &Path) -> Result<Self, PlatformError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read(path).map_err(|e| {
            PlatformError::Internal(format!("failed to read state {}: {e}", path.display()))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            PlatformError::Internal(format!("corrupt state file {}: {e}", path.display()))
        })
    }

    /// Write the snapshot next to `path` and rename it into place.
    pub(crate) fn save(&self, path: &Path) -> Result<(), PlatformError> {
        let io_err = |e: std::io::Error| {
            PlatformError::Internal(format!("failed to write state {}: {e}", path.display()))
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| PlatformError::Internal(format!("failed to encode state: {e}")))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }
}
