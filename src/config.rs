//! Configuration for camux-provision
//!
//! Configuration is layered, later sources winning:
//! - Default values
//! - The stack file (`./camux.stack.yaml`, `CAMUX_STACK_FILE`, or `--stack-file`)
//! - Environment variables (`CAMUX_PROJECT_NAME`, `CAMUX_BILLING_ACCOUNT`,
//!   `CAMUX_ORGANIZATION_ID`)
//!
//! The stack file holds a flat `config:` map read by the provisioning
//! workflow and a `gcp:` section for the REST backend:
//!
//! ```yaml
//! config:
//!   projectName: camux
//!   billingAccount: 0123AB-4567CD-89EFGH
//! gcp:
//!   operation_timeout_secs: 600
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Stack file used when none is given explicitly.
pub const DEFAULT_STACK_FILE: &str = "camux.stack.yaml";

/// Base name of the project when `projectName` is unset.
pub const DEFAULT_PROJECT_NAME: &str = "camux";

pub const PROJECT_NAME_KEY: &str = "projectName";
pub const BILLING_ACCOUNT_KEY: &str = "billingAccount";
pub const ORGANIZATION_ID_KEY: &str = "organizationId";

/// Keys the workflow understands, with the environment variable overriding each.
pub const KNOWN_KEYS: &[(&str, &str)] = &[
    (PROJECT_NAME_KEY, "CAMUX_PROJECT_NAME"),
    (BILLING_ACCOUNT_KEY, "CAMUX_BILLING_ACCOUNT"),
    (ORGANIZATION_ID_KEY, "CAMUX_ORGANIZATION_ID"),
];

/// Flat key-value configuration read by the provisioning workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, serde_yaml::Value>",
    into = "IndexMap<String, String>"
)]
pub struct ConfigValues {
    values: IndexMap<String, String>,
}

impl ConfigValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw value, empty strings included.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value if present and non-empty.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Value that must be present and non-empty.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get_non_empty(key)
            .ok_or_else(|| Error::missing_required(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay values from the `CAMUX_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        for (key, var) in KNOWN_KEYS {
            if let Ok(value) = std::env::var(var) {
                debug!("Overriding {} from {}", key, var);
                self.set(*key, value);
            }
        }
    }
}

impl TryFrom<IndexMap<String, serde_yaml::Value>> for ConfigValues {
    type Error = String;

    fn try_from(raw: IndexMap<String, serde_yaml::Value>) -> std::result::Result<Self, String> {
        let mut values = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            let value = match value {
                serde_yaml::Value::Null => continue,
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => return Err(format!("configuration value for '{}' must be a scalar", key)),
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }
}

impl From<ConfigValues> for IndexMap<String, String> {
    fn from(config: ConfigValues) -> Self {
        config.values
    }
}

/// The workflow's validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub project_name: String,
    pub billing_account: String,
    /// `None` when unset or empty
    pub organization_id: Option<String>,
}

impl ProvisionConfig {
    /// Read and validate the workflow's keys.
    pub fn from_values(values: &ConfigValues) -> Result<Self> {
        let project_name = values
            .get_non_empty(PROJECT_NAME_KEY)
            .unwrap_or(DEFAULT_PROJECT_NAME)
            .to_string();
        let billing_account = values.require(BILLING_ACCOUNT_KEY)?.to_string();
        let organization_id = values
            .get_non_empty(ORGANIZATION_ID_KEY)
            .map(str::to_string);

        Ok(Self {
            project_name,
            billing_account,
            organization_id,
        })
    }
}

/// Settings for the Google Cloud REST backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpSettings {
    /// OAuth2 access token; falls back to `GOOGLE_OAUTH_ACCESS_TOKEN`, then gcloud
    pub access_token: Option<String>,
    pub resource_manager_endpoint: String,
    pub billing_endpoint: String,
    pub service_usage_endpoint: String,
    pub iam_endpoint: String,
    /// Delay between long-running operation polls
    pub operation_poll_interval_ms: u64,
    /// Give up on a long-running operation after this long
    pub operation_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            resource_manager_endpoint: "https://cloudresourcemanager.googleapis.com".to_string(),
            billing_endpoint: "https://cloudbilling.googleapis.com".to_string(),
            service_usage_endpoint: "https://serviceusage.googleapis.com".to_string(),
            iam_endpoint: "https://iam.googleapis.com".to_string(),
            operation_poll_interval_ms: 2000,
            operation_timeout_secs: 300,
            request_timeout_secs: 60,
        }
    }
}

/// Everything loaded from the stack file and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Flat values read by the workflow
    pub config: ConfigValues,
    /// REST backend settings
    pub gcp: GcpSettings,
}

impl Settings {
    /// Load settings from the stack file and environment.
    ///
    /// A missing stack file is not an error; every value then comes from
    /// defaults and the environment.
    pub fn load(stack_file: Option<&Path>) -> Result<Self> {
        let path = resolve_stack_file(stack_file);

        let mut settings = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!("Stack file {} not found, using defaults", path.display());
            Settings::default()
        };

        for (key, _) in settings.config.iter() {
            if !is_known_key(key) {
                warn!("Ignoring unknown configuration key '{}'", key);
            }
        }

        settings.config.apply_env_overrides();
        Ok(settings)
    }

    /// Parse a stack file without applying environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Stack file path: explicit argument, else the default in the working directory.
pub fn resolve_stack_file(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STACK_FILE))
}

pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.iter().any(|(k, _)| *k == key)
}

fn ensure_known_key(key: &str) -> Result<()> {
    if is_known_key(key) {
        return Ok(());
    }
    Err(Error::UnknownConfigKey {
        key: key.to_string(),
        valid: KNOWN_KEYS
            .iter()
            .map(|(k, _)| *k)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Set `config.<key>` in the stack file, creating the file if needed.
///
/// Other sections of the file are preserved. The write is atomic.
pub fn set_stack_value(path: &Path, key: &str, value: &str) -> Result<()> {
    ensure_known_key(key)?;

    let mut document = read_document(path)?;
    let root = document
        .as_mapping_mut()
        .ok_or_else(|| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: "stack file must be a YAML mapping".to_string(),
        })?;

    let config_key = serde_yaml::Value::String("config".to_string());
    if !matches!(root.get(&config_key), Some(serde_yaml::Value::Mapping(_))) {
        root.insert(config_key.clone(), serde_yaml::Value::Mapping(Default::default()));
    }
    if let Some(serde_yaml::Value::Mapping(config)) = root.get_mut(&config_key) {
        config.insert(
            serde_yaml::Value::String(key.to_string()),
            serde_yaml::Value::String(value.to_string()),
        );
    }

    write_document(path, &document)
}

/// Remove `config.<key>` from the stack file. Returns whether it was present.
pub fn unset_stack_value(path: &Path, key: &str) -> Result<bool> {
    ensure_known_key(key)?;
    if !path.exists() {
        return Ok(false);
    }

    let mut document = read_document(path)?;
    let removed = document
        .get_mut("config")
        .and_then(serde_yaml::Value::as_mapping_mut)
        .and_then(|config| config.remove(key))
        .is_some();

    if removed {
        write_document(path, &document)?;
    }
    Ok(removed)
}

fn read_document(path: &Path) -> Result<serde_yaml::Value> {
    if !path.exists() {
        return Ok(serde_yaml::Value::Mapping(Default::default()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Mapping(Default::default()));
    }
    serde_yaml::from_str(&content).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_document(path: &Path, document: &serde_yaml::Value) -> Result<()> {
    let write_err = |message: String| Error::ConfigWrite {
        path: path.to_path_buf(),
        message,
    };

    let content = serde_yaml::to_string(document).map_err(|e| write_err(e.to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| write_err(e.to_string()))?;
    std::io::Write::write_all(&mut tmp, content.as_bytes()).map_err(|e| write_err(e.to_string()))?;
    tmp.persist(path).map_err(|e| write_err(e.to_string()))?;
    Ok(())
}
