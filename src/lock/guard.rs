//! RAII lock guard implementation.

use super::LockStore;
use crate::error::Result;
use crate::store::ObjectStore;
use tracing::warn;

/// RAII guard for an acquired lock.
///
/// When dropped, the lock is released through [`LockStore::unlock`], so it is
/// only removed if this owner still holds it. Failures during drop are logged
/// as warnings and never panic.
#[derive(Debug)]
pub struct LockGuard<'a, S: ObjectStore> {
    locks: &'a LockStore<S>,

    owner: String,

    resource: String,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, S: ObjectStore> LockGuard<'a, S> {
    pub(super) fn new(locks: &'a LockStore<S>, owner: &str, resource: &str) -> Self {
        Self {
            locks,
            owner: owner.to_string(),
            resource: resource.to_string(),
            released: false,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Whether this owner still holds the lock and it stays valid for at
    /// least `time_ms` more milliseconds.
    pub fn is_held_for(&self, time_ms: u64) -> Result<bool> {
        self.locks
            .is_owned_and_will_be_locked_for(&self.owner, &self.resource, time_ms)
    }

    /// Manually release the lock.
    ///
    /// Returns `Ok(false)` if the lock was no longer owned by this guard's
    /// owner (e.g. it expired and someone else acquired it).
    pub fn release(mut self) -> Result<bool> {
        self.released = true;
        self.locks.unlock(&self.owner, &self.resource)
    }
}

impl<S: ObjectStore> Drop for LockGuard<'_, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match self.locks.unlock(&self.owner, &self.resource) {
            Ok(true) => {}
            Ok(false) => warn!(
                owner = %self.owner,
                resource = %self.resource,
                "lock was no longer held by its guard at release"
            ),
            Err(e) => warn!(
                owner = %self.owner,
                resource = %self.resource,
                error = %e,
                "failed to release lock"
            ),
        }
    }
}
