//! The lock protocol over an object store.
//!
//! Every lock lives in a single object whose key is derived from the resource
//! name (see [`LockKey`]). An absent object is the unlocked state; there are
//! no tombstones.
//!
//! # Protocol
//!
//! Each operation reads the current [`LockRecord`] once and decides from that
//! snapshot. Mutating operations then issue one `put` or `delete`:
//! - `lock`: if the resource is not locked, write a fresh record
//! - `unlock`: if the record's owner matches, delete the object
//!
//! Contention (already locked, wrong owner) is reported as `false`, never as
//! an error.
//!
//! # Race Window
//!
//! The store has no conditional write, so the read and the write of `lock`
//! are not atomic. Two clients that both read "unlocked" before either writes
//! will both write, the later write replaces the earlier one, and both callers
//! are told they hold the lock. This is last-writer-wins, not mutual
//! exclusion. Callers that need a stronger guarantee can confirm ownership
//! after acquiring with [`LockStore::is_owned_and_will_be_locked_for`], which
//! narrows the window but does not close it.

mod guard;
mod key;

#[cfg(test)]
mod tests;

pub use guard::LockGuard;
pub use key::{DEFAULT_PREFIX, DEFAULT_SUFFIX, LockKey};

use crate::error::{LockError, Result};
use crate::record::LockRecord;
use crate::record::timestamp::timestamp_after;
use crate::store::ObjectStore;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Distributed locks stored in one bucket of an object store.
#[derive(Debug)]
pub struct LockStore<S: ObjectStore> {
    store: S,
    bucket: String,
    keys: LockKey,
}

impl<S: ObjectStore> LockStore<S> {
    /// Create a lock store.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Configuration` if the bucket is empty or if both
    /// `prefix` and `suffix` are empty.
    pub fn new(
        store: S,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self> {
        Self::with_keys(store, bucket, LockKey::new(prefix, suffix)?)
    }

    /// Create a lock store using an existing key scheme.
    pub fn with_keys(store: S, bucket: impl Into<String>, keys: LockKey) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(LockError::Configuration(
                "bucket must not be empty".to_string(),
            ));
        }

        Ok(Self {
            store,
            bucket,
            keys,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn keys(&self) -> &LockKey {
        &self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The object key holding the lock for `resource`.
    pub fn key_for(&self, resource: &str) -> String {
        self.keys.key_for(resource)
    }

    /// Read the current lock record for `resource`, if any.
    ///
    /// # Errors
    ///
    /// - `LockError::Store` if the store fails for any reason other than a
    ///   missing object
    /// - `LockError::MalformedRecord` if the object exists but is not a lock
    ///   record
    pub fn read_record(&self, resource: &str) -> Result<Option<LockRecord>> {
        let key = self.key_for(resource);

        let bytes = match self.store.get(&self.bucket, &key) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!(bucket = %self.bucket, key = %key, "no lock object");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let record = LockRecord::decode(&bytes).inspect_err(|e| {
            warn!(bucket = %self.bucket, key = %key, error = %e, "unreadable lock object");
        })?;

        debug!(
            bucket = %self.bucket,
            key = %key,
            owner = %record.owner(),
            expires_at = record.expires_at().unwrap_or("unset"),
            "read lock record"
        );
        Ok(Some(record))
    }

    /// Whether `resource` is currently locked by anyone.
    pub fn is_locked(&self, resource: &str) -> Result<bool> {
        Ok(self
            .read_record(resource)?
            .is_some_and(|record| record.is_locked()))
    }

    /// Try to lock `resource` for `duration_ms` milliseconds.
    ///
    /// Returns `Ok(false)` without writing if the resource is currently
    /// locked (by anyone, including `owner`). Otherwise writes a new record,
    /// replacing any expired one, and returns `Ok(true)`. See the module docs
    /// for the race window between the check and the write.
    pub fn lock(&self, owner: &str, resource: &str, duration_ms: u64) -> Result<bool> {
        let current = self.read_record(resource)?;

        if let Some(current) = &current {
            if current.is_locked() {
                debug!(
                    resource,
                    holder = %current.owner(),
                    "lock is held"
                );
                return Ok(false);
            }
            debug!(
                resource,
                previous_owner = %current.owner(),
                "replacing expired lock"
            );
        }

        let record = LockRecord::new(owner, resource, duration_ms);
        self.store
            .put(&self.bucket, &self.key_for(resource), &record.encode())?;

        info!(
            owner,
            resource,
            duration_ms,
            expires_at = record.expires_at().unwrap_or("unset"),
            "acquired lock"
        );
        Ok(true)
    }

    /// Release `owner`'s lock on `resource`.
    ///
    /// Returns `Ok(false)` and leaves the object untouched if there is no
    /// record or it belongs to a different owner. An expired record still
    /// belongs to its owner and can be released.
    pub fn unlock(&self, owner: &str, resource: &str) -> Result<bool> {
        if !self.is_owned(owner, resource)? {
            debug!(owner, resource, "not the lock owner; not unlocking");
            return Ok(false);
        }

        self.store.delete(&self.bucket, &self.key_for(resource))?;

        info!(owner, resource, "released lock");
        Ok(true)
    }

    /// Whether a record for `resource` exists and belongs to `owner`,
    /// regardless of expiry.
    pub fn is_owned(&self, owner: &str, resource: &str) -> Result<bool> {
        Ok(self
            .read_record(resource)?
            .is_some_and(|record| record.owner() == owner))
    }

    /// Whether `owner` holds the lock on `resource` and it stays valid for
    /// more than `time_ms` milliseconds from now.
    pub fn is_owned_and_will_be_locked_for(
        &self,
        owner: &str,
        resource: &str,
        time_ms: u64,
    ) -> Result<bool> {
        let Some(record) = self.read_record(resource)? else {
            return Ok(false);
        };

        let threshold = timestamp_after(Utc::now(), time_ms);
        Ok(record.owner() == owner && record.expires_after(&threshold))
    }

    /// Lock `resource` and return a guard that unlocks it when dropped.
    ///
    /// Returns `Ok(None)` if the resource is currently locked.
    pub fn try_acquire(
        &self,
        owner: &str,
        resource: &str,
        duration_ms: u64,
    ) -> Result<Option<LockGuard<'_, S>>> {
        if !self.lock(owner, resource, duration_ms)? {
            return Ok(None);
        }
        Ok(Some(LockGuard::new(self, owner, resource)))
    }

    /// Delete the lock object for `resource` regardless of owner or expiry.
    ///
    /// Returns the record that was removed, if any. An object that cannot be
    /// decoded is removed as well and reported as `None`. The caller is
    /// responsible for deciding that clearing someone else's lock is
    /// appropriate.
    pub fn force_unlock(&self, resource: &str) -> Result<Option<LockRecord>> {
        let previous = match self.read_record(resource) {
            Ok(previous) => previous,
            Err(LockError::MalformedRecord(reason)) => {
                warn!(resource, reason = %reason, "clearing malformed lock object");
                None
            }
            Err(e) => return Err(e),
        };

        self.store.delete(&self.bucket, &self.key_for(resource))?;

        if let Some(record) = &previous {
            warn!(
                resource,
                owner = %record.owner(),
                "cleared lock without owner check"
            );
        }
        Ok(previous)
    }
}
