//! Config loading, validation, and lock store construction.

use super::model::{CONFIG_FILE_NAME, Config};
use crate::error::{LockError, Result};
use crate::lock::{LockKey, LockStore};
use crate::store::FilesystemStore;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LockError::Configuration)` - Read, parse, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::Configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&content)
    }

    /// Load `bucketlock.yaml` from `dir` if it exists, otherwise use defaults.
    pub fn discover_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            debug!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Load `bucketlock.yaml` from the current directory if it exists,
    /// otherwise use defaults.
    pub fn discover() -> Result<Self> {
        Self::discover_in(".")
    }

    /// Parse config from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                LockError::Configuration(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockError::Configuration(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `bucket` must be non-empty
    /// - at least one of `prefix` and `suffix` must be non-empty
    /// - `owner`, when set, must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(LockError::Configuration(
                "config validation failed: bucket must not be empty".to_string(),
            ));
        }

        if self.prefix.is_empty() && self.suffix.is_empty() {
            return Err(LockError::Configuration(
                "config validation failed: at least one of prefix or suffix must be non-empty"
                    .to_string(),
            ));
        }

        if self.owner.as_deref().is_some_and(str::is_empty) {
            return Err(LockError::Configuration(
                "config validation failed: owner must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured owner, or `user@HOST` when none is set.
    pub fn owner_or_default(&self) -> String {
        self.owner.clone().unwrap_or_else(default_owner)
    }

    /// Build a lock store over the configured filesystem store.
    pub fn open_lock_store(&self) -> Result<LockStore<FilesystemStore>> {
        self.validate()?;
        let keys = LockKey::new(self.prefix.as_str(), self.suffix.as_str())?;
        LockStore::with_keys(FilesystemStore::new(&self.root), self.bucket.as_str(), keys)
    }
}

/// Owner string identifying this user and machine (`user@HOST`).
pub fn default_owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
