//! Error types for bucketlock.
//!
//! Uses thiserror for derive macros. Lock contention (already locked, wrong
//! owner) is never an error: those outcomes are reported as `false` by the
//! boolean lock operations. Errors are reserved for configuration faults,
//! store failures, and corrupt lock objects.

use crate::exit_codes;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for bucketlock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// The lock store or config file is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The user provided invalid arguments.
    #[error("{0}")]
    InvalidArgument(String),

    /// The underlying object store failed (anything other than "not found").
    #[error("object store error: {0}")]
    Store(#[from] StoreError),

    /// A payload could not be decoded as a lock record.
    #[error("malformed lock record: {0}")]
    MalformedRecord(String),
}

impl LockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::Configuration(_) => exit_codes::USER_ERROR,
            LockError::InvalidArgument(_) => exit_codes::USER_ERROR,
            LockError::Store(_) => exit_codes::STORE_FAILURE,
            LockError::MalformedRecord(_) => exit_codes::MALFORMED_RECORD,
        }
    }
}

/// Result type alias for bucketlock operations.
pub type Result<T> = std::result::Result<T, LockError>;
