//! Object-store collaborators for bucketlock.
//!
//! The lock protocol only needs three primitives from a store:
//! - `get`: fetch an object's bytes, failing with [`StoreError::NotFound`] when absent
//! - `put`: write an object, unconditionally replacing any existing one
//! - `delete`: remove an object; deleting a missing key is not an error
//!
//! None of them is conditional. There is no create-if-absent or
//! compare-and-swap, so a read followed by a write is never atomic across
//! clients. Retries and timeouts are the store's concern.
//!
//! Two stores ship with the crate: [`MemoryStore`] for tests and single-process
//! use, and [`FilesystemStore`], which maps buckets to directories.

mod filesystem;
mod memory;


pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;

use std::sync::Arc;
use thiserror::Error;

/// Errors reported by an object store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists under the key.
    #[error("no object '{key}' in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    /// An IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other store failure (permissions, throttling, invalid key, ...).
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub(crate) fn not_found(bucket: &str, key: &str) -> Self {
        StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// Whether this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A bucketed key/value object store.
pub trait ObjectStore {
    /// Fetch the object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if there is no such object.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Store `value` under `key`, replacing any existing object.
    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove the object under `key`. Succeeds if the object does not exist.
    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(bucket, key)
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(bucket, key, value)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(bucket, key)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(bucket, key)
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(bucket, key, value)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(bucket, key)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(bucket, key)
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(bucket, key, value)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(bucket, key)
    }
}
