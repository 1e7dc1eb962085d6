use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable carrying the operator account identifier.
pub const ENV_OPERATOR_ID: &str = "OPERATOR_ID";
/// Environment variable carrying the operator private key.
pub const ENV_OPERATOR_KEY: &str = "OPERATOR_KEY";
pub const ENV_KEY_CURVE: &str = "LEDGER_KEY_CURVE";
pub const ENV_KEY_STORE: &str = "LEDGER_KEY_STORE";
pub const ENV_LOG_LEVEL: &str = "LEDGER_LOG_LEVEL";

/// Process-wide configuration stored at `~/.ledger/config.json`.
///
/// The operator private key is **never** written to the JSON file. It is
/// supplied through the process environment (`OPERATOR_KEY`, optionally via a
/// `.env` file) and kept in memory only.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Operator account, e.g. `0.0.1001`. Used as the fallback treasury.
    pub operator_id: Option<String>,

    #[serde(skip)]
    pub operator_key: Option<String>,

    /// Curve assumed for raw (non-DER) key strings: `ed25519` or `ecdsa`.
    pub key_curve: String,

    /// Encrypted key store used to resolve named key references.
    pub key_store_path: Option<PathBuf>,

    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            operator_id: None,
            operator_key: None,
            key_curve: "ed25519".into(),
            key_store_path: None,
            log_level: "info".into(),
        }
    }
}

impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("operator_id", &self.operator_id)
            .field(
                "operator_key",
                &self.operator_key.as_ref().map(|_| "<redacted>"),
            )
            .field("key_curve", &self.key_curve)
            .field("key_store_path", &self.key_store_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl LedgerConfig {
    /// Returns the base config directory: `~/.ledger/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".ledger"))
    }

    /// Returns the config file path: `~/.ledger/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.ledger/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Loads the config file (if any) and applies overrides from the process
    /// environment, including a `.env` file in the working directory.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        let path = Self::config_path()?;
        let mut config = Self::load_from_path(&path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load config from a specific file path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to a specific file path (the operator key is excluded via
    /// `#[serde(skip)]`).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Overlay values found by `lookup` on top of the current config. Empty
    /// values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(id) = get(ENV_OPERATOR_ID) {
            self.operator_id = Some(id);
        }
        if let Some(key) = get(ENV_OPERATOR_KEY) {
            self.operator_key = Some(key);
        }
        if let Some(curve) = get(ENV_KEY_CURVE) {
            self.key_curve = curve;
        }
        if let Some(path) = get(ENV_KEY_STORE) {
            self.key_store_path = Some(PathBuf::from(path));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_sensible() {
        let config = LedgerConfig::default();
        assert!(config.operator_id.is_none());
        assert!(config.operator_key.is_none());
        assert_eq!(config.key_curve, "ed25519");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.key_curve, "ed25519");
    }

    #[test]
    fn save_excludes_operator_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = LedgerConfig {
            operator_id: Some("0.0.1001".into()),
            operator_key: Some("deadbeef".into()),
            ..Default::default()
        };
        config.save_to_path(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("0.0.1001"));
        assert!(!raw.contains("deadbeef"));

        let loaded = LedgerConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.operator_id.as_deref(), Some("0.0.1001"));
        assert!(loaded.operator_key.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "log_level": "debug" }"#).unwrap();

        let config = LedgerConfig::load_from_path(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.key_curve, "ed25519");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(LedgerConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = LedgerConfig {
            operator_id: Some("0.0.2".into()),
            ..Default::default()
        };
        config.apply_env_overrides(lookup_from(&[
            (ENV_OPERATOR_ID, "0.0.1001"),
            (ENV_OPERATOR_KEY, "abc123"),
            (ENV_KEY_CURVE, "ecdsa"),
            (ENV_KEY_STORE, "/tmp/keys.json"),
        ]));

        assert_eq!(config.operator_id.as_deref(), Some("0.0.1001"));
        assert_eq!(config.operator_key.as_deref(), Some("abc123"));
        assert_eq!(config.key_curve, "ecdsa");
        assert_eq!(config.key_store_path, Some(PathBuf::from("/tmp/keys.json")));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = LedgerConfig {
            operator_id: Some("0.0.2".into()),
            ..Default::default()
        };
        config.apply_env_overrides(lookup_from(&[(ENV_OPERATOR_ID, "  ")]));
        assert_eq!(config.operator_id.as_deref(), Some("0.0.2"));
    }

    #[test]
    fn debug_output_redacts_operator_key() {
        let config = LedgerConfig {
            operator_id: Some("0.0.1001".into()),
            operator_key: Some("302e020100300506032b657004220420deadbeef".into()),
            ..LedgerConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(printed.contains("0.0.1001"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("deadbeef"));
    }
}
