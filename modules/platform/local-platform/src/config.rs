//! Configuration for the local platform.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Local platform configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalPlatformConfig {
    /// Project identifier; used as the token audience.
    pub project_id: String,

    /// Bucket name reported in logs.
    pub storage_bucket: String,

    /// HMAC secret for ID tokens.
    #[serde(skip_serializing)]
    pub token_secret: String,

    /// ID token lifetime.
    pub token_ttl_secs: u64,

    /// JSON snapshot shared by separate CLI invocations. `None` keeps state in memory.
    pub state_path: Option<PathBuf>,
}

impl Default for LocalPlatformConfig {
    fn default() -> Self {
        Self {
            project_id: "tenantdash-local".to_owned(),
            storage_bucket: "tenantdash-local.appspot.com".to_owned(),
            token_secret: "tenantdash-local-secret".to_owned(),
            token_ttl_secs: 3600,
            state_path: None,
        }
    }
}

impl LocalPlatformConfig {
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("https://securetoken.local/{}", self.project_id)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn secret_is_never_serialized() {
        let json = serde_json::to_value(LocalPlatformConfig::default()).unwrap();
        assert!(json.get("token_secret").is_none());
        assert_eq!(json["token_ttl_secs"], 3600);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: LocalPlatformConfig =
            serde_json::from_str(r#"{"project_id":"demo","state_path":"/tmp/s.json"}"#).unwrap();
        assert_eq!(cfg.project_id, "demo");
        assert_eq!(cfg.token_ttl_secs, 3600);
        assert_eq!(cfg.issuer(), "https://securetoken.local/demo");
    }
}
