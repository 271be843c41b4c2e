use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use fixtures::FixtureConfig;
use local_platform::LocalPlatformConfig;
use serde::{Deserialize, Serialize};
use tenantdash_security::AccessPolicy;

/// Prefix for namespaced overrides, e.g. `TENANTDASH__FIXTURES__COMPANY_ID`.
pub const ENV_PREFIX: &str = "TENANTDASH__";

/// Flat variable names kept for existing `.env` files.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("COMPANY_ID", "fixtures.company_id"),
    ("SUPERADMIN_UID", "fixtures.roles.super_admin"),
    ("ADMIN_UID", "fixtures.roles.admin"),
    ("VENDOR_UID", "fixtures.roles.vendor"),
    ("FIREBASE_PROJECT_ID", "platform.project_id"),
    ("FIREBASE_STORAGE_BUCKET", "platform.storage_bucket"),
];

pub const DEFAULT_STATE_PATH: &str = ".tenantdash/state.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when neither `-v` nor `RUST_LOG` is given.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub platform: LocalPlatformConfig,
    pub fixtures: FixtureConfig,
    pub access: AccessPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            platform: LocalPlatformConfig {
                state_path: Some(PathBuf::from(DEFAULT_STATE_PATH)),
                ..LocalPlatformConfig::default()
            },
            fixtures: FixtureConfig::default(),
            access: AccessPolicy::default(),
        }
    }
}

fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

impl AppConfig {
    /// Defaults, then the YAML file, then legacy variables, then `TENANTDASH__*`.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(legacy_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path
            && !path.is_file()
        {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
        Self::figment(path)
            .extract()
            .context("failed to load configuration")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to render configuration")
    }
}
