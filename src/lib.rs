//! Bucketlock: time-bounded distributed locks stored in an object-storage bucket.
//!
//! Independent processes agree on who owns a named resource using nothing but
//! `get`/`put`/`delete` on a shared bucket. Each lock is one object holding a
//! JSON [`LockRecord`]; an absent object means unlocked.
//!
//! The store offers no conditional writes, so acquisition is check-then-write
//! and concurrent acquirers can both succeed (the later write wins). See
//! [`lock`] for the details of this race window.
//!
//! ```no_run
//! use bucketlock::lock::LockStore;
//! use bucketlock::store::FilesystemStore;
//!
//! let locks = LockStore::new(FilesystemStore::new("/mnt/shared"), "locks", "", ".lock")?;
//! if locks.lock("worker-1", "nightly-report", 30_000)? {
//!     // ... do the work ...
//!     locks.unlock("worker-1", "nightly-report")?;
//! }
//! # Ok::<(), bucketlock::error::LockError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod lock;
pub mod record;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::{LockError, Result};
pub use lock::{LockGuard, LockKey, LockStore};
pub use record::LockRecord;
pub use store::{FilesystemStore, MemoryStore, ObjectStore, StoreError};
