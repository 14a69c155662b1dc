//! Config struct definition and default implementation.

use crate::lock::{DEFAULT_PREFIX, DEFAULT_SUFFIX};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name looked up in the current directory by `Config::discover`.
pub const CONFIG_FILE_NAME: &str = "bucketlock.yaml";

/// Configuration for a bucketlock client.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock keys
    // =========================================================================
    /// Bucket holding the lock objects (default: "locks").
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Prefix prepended to every resource name to form its lock key.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Suffix appended to every resource name to form its lock key
    /// (default: ".lock").
    #[serde(default = "default_suffix")]
    pub suffix: String,

    // =========================================================================
    // Store
    // =========================================================================
    /// Root directory of the filesystem store; buckets are subdirectories.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    // =========================================================================
    // Lock defaults
    // =========================================================================
    /// Lock duration used when none is given on the command line.
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,

    /// Owner identifier used when none is given. Defaults to `user@HOST`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            prefix: default_prefix(),
            suffix: default_suffix(),
            root: default_root(),
            default_duration_ms: default_duration_ms(),
            owner: None,
        }
    }
}

fn default_bucket() -> String {
    "locks".to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from(".bucketlock")
}

fn default_duration_ms() -> u64 {
    10_000
}
