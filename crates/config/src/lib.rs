use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "boleto-tracker";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    /// Expire overdue pending boletos every time the tracker starts.
    #[serde(default)]
    pub auto_expire_overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    #[serde(default = "default_slot_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            key: default_slot_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: default_audit_path(),
        }
    }
}

impl AuditConfig {
    /// The audit log path when auditing is switched on.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.enabled.then(|| self.path.clone())
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".boletos_db")
}

fn default_slot_key() -> String {
    "boletos".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("boletos_audit.jsonl")
}

pub fn load() -> Result<AppConfig> {
    let cfg: AppConfig = confy::load(APP_NAME, None).context("Failed to load app config")?;
    Ok(cfg)
}

pub fn store(cfg: &AppConfig) -> Result<()> {
    confy::store(APP_NAME, None, cfg).context("Failed to store app config")?;
    Ok(())
}

pub fn config_path() -> Result<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, None).context("Failed to resolve config path")
}
