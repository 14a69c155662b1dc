//! Lock key derivation.

use crate::error::{LockError, Result};

/// Default key prefix.
pub const DEFAULT_PREFIX: &str = "";

/// Default key suffix.
pub const DEFAULT_SUFFIX: &str = ".lock";

/// Maps resource names to object keys: `prefix + resource + suffix`.
///
/// At least one of prefix and suffix is non-empty, so lock objects cannot be
/// confused with the resources themselves or with other objects that happen
/// to share a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockKey {
    prefix: String,
    suffix: String,
}

impl LockKey {
    /// Create a key scheme.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Configuration` if both `prefix` and `suffix` are empty.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();

        if prefix.is_empty() && suffix.is_empty() {
            return Err(LockError::Configuration(
                "at least one of prefix or suffix must be non-empty".to_string(),
            ));
        }

        Ok(Self { prefix, suffix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The object key holding the lock for `resource`.
    pub fn key_for(&self, resource: &str) -> String {
        format!("{}{}{}", self.prefix, resource, self.suffix)
    }
}

impl Default for LockKey {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}
