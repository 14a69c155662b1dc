//! Configuration model for bucketlock.
//!
//! This module defines the Config struct that represents `bucketlock.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.
//!
//! The library itself takes its settings as constructor arguments; Config is
//! the thin layer the CLI uses to build a `LockStore` from a file.

mod model;
mod operations;


// Re-export public API
pub use model::{CONFIG_FILE_NAME, Config};
pub use operations::default_owner;
