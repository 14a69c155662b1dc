//! In-process object store.

use super::{ObjectStore, StoreError};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Objects = HashMap<(String, String), Vec<u8>>;

/// An object store held in memory.
///
/// Share one instance (e.g. behind an `Arc`) between several lock stores to
/// model independent clients of the same bucket.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<Objects>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects across all buckets.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every mutation is a single insert or remove; poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Objects> {
        self.objects
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Objects> {
        self.objects
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(bucket, key))
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.write()
            .insert((bucket.to_string(), key.to_string()), value.to_vec());
        Ok(())
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.write().remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
