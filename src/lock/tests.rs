//! Tests for the lock protocol.

use super::*;
use crate::record::timestamp::format_timestamp;
use crate::store::{FilesystemStore, MemoryStore, StoreError};
use chrono::Duration;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const BUCKET: &str = "test-bucket";

fn create_locks() -> LockStore<MemoryStore> {
    LockStore::new(MemoryStore::new(), BUCKET, DEFAULT_PREFIX, DEFAULT_SUFFIX).unwrap()
}

/// Write a record straight to the store, bypassing `lock`.
fn put_record<S: ObjectStore>(locks: &LockStore<S>, record: &LockRecord) {
    locks
        .store()
        .put(BUCKET, &locks.key_for(record.resource()), &record.encode())
        .unwrap();
}

fn expired_record(owner: &str, resource: &str) -> LockRecord {
    LockRecord::with_expires_at(
        owner,
        resource,
        1000,
        Some(format_timestamp(Utc::now() - Duration::minutes(5))),
    )
}

/// A store whose every call fails, as a network outage would.
struct UnavailableStore;

impl ObjectStore for UnavailableStore {
    fn get(&self, _bucket: &str, _key: &str) -> std::result::Result<Vec<u8>, StoreError> {
        Err(StoreError::Other("service unavailable".to_string()))
    }

    fn put(&self, _bucket: &str, _key: &str, _value: &[u8]) -> std::result::Result<(), StoreError> {
        Err(StoreError::Other("service unavailable".to_string()))
    }

    fn delete(&self, _bucket: &str, _key: &str) -> std::result::Result<(), StoreError> {
        Err(StoreError::Other("service unavailable".to_string()))
    }
}

#[test]
fn test_construction_requires_prefix_or_suffix() {
    let err = LockStore::new(MemoryStore::new(), BUCKET, "", "").unwrap_err();
    assert!(matches!(err, LockError::Configuration(_)));

    assert!(LockStore::new(MemoryStore::new(), BUCKET, "locks/", "").is_ok());
    assert!(LockStore::new(MemoryStore::new(), BUCKET, "", ".lock").is_ok());
}

#[test]
fn test_construction_requires_bucket() {
    let err = LockStore::new(MemoryStore::new(), "", "", ".lock").unwrap_err();
    assert!(matches!(err, LockError::Configuration(_)));
}

#[test]
fn test_unlocked_resource() {
    let locks = create_locks();

    assert!(locks.read_record("res").unwrap().is_none());
    assert!(!locks.is_locked("res").unwrap());
    assert!(!locks.is_owned("alice", "res").unwrap());
    assert!(
        !locks
            .is_owned_and_will_be_locked_for("alice", "res", 0)
            .unwrap()
    );
}

#[test]
fn test_lock_writes_record() {
    let locks = create_locks();

    assert!(locks.lock("test", "test", 1000).unwrap());

    let data = locks.store().get(BUCKET, "test.lock").unwrap();
    assert!(!data.is_empty());

    let record = LockRecord::decode(&data).unwrap();
    assert_eq!(record.owner(), "test");
    assert_eq!(record.resource(), "test");
    assert_eq!(record.duration_ms(), 1000);
    assert!(locks.is_locked("test").unwrap());
}

#[test]
fn test_lock_uses_prefix_and_suffix() {
    let locks = LockStore::new(MemoryStore::new(), BUCKET, "locks/", ".lck").unwrap();
    assert!(locks.lock("alice", "jobs/nightly", 1000).unwrap());

    assert!(
        locks
            .store()
            .get(BUCKET, "locks/jobs/nightly.lck")
            .is_ok()
    );
}

#[test]
fn test_lock_on_locked_resource_fails_without_writing() {
    let locks = create_locks();
    assert!(locks.lock("alice", "res", 60_000).unwrap());
    let before = locks.store().get(BUCKET, "res.lock").unwrap();

    assert!(!locks.lock("bob", "res", 60_000).unwrap());
    // The holder cannot re-lock either
    assert!(!locks.lock("alice", "res", 120_000).unwrap());

    let after = locks.store().get(BUCKET, "res.lock").unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_zero_duration_lock_is_immediately_free() {
    let locks = create_locks();
    assert!(locks.lock("alice", "res", 0).unwrap());
    assert!(!locks.is_locked("res").unwrap());

    assert!(locks.lock("bob", "res", 1000).unwrap());
    assert!(locks.is_owned("bob", "res").unwrap());
}

#[test]
fn test_expired_lock_can_be_taken_over() {
    let locks = create_locks();
    put_record(&locks, &expired_record("alice", "res"));

    assert!(!locks.is_locked("res").unwrap());
    assert!(locks.lock("bob", "res", 500).unwrap());
    assert!(locks.is_owned("bob", "res").unwrap());
    assert!(!locks.is_owned("alice", "res").unwrap());
}

#[test]
fn test_scenario_lock_expire_relock() {
    let locks = create_locks();

    assert!(locks.lock("alice", "res", 1000).unwrap());
    assert!(locks.is_locked("res").unwrap());

    // Simulate the passage of time by replacing the record with an expired one
    put_record(&locks, &expired_record("alice", "res"));
    assert!(!locks.is_locked("res").unwrap());

    assert!(locks.lock("bob", "res", 500).unwrap());
}

#[test]
fn test_scenario_lock_expires_in_real_time() {
    let locks = create_locks();

    assert!(locks.lock("alice", "res", 50).unwrap());
    assert!(locks.is_locked("res").unwrap());

    thread::sleep(std::time::Duration::from_millis(100));
    assert!(!locks.is_locked("res").unwrap());
    assert!(locks.lock("bob", "res", 500).unwrap());
}

#[test]
fn test_scenario_unlock_requires_owner() {
    let locks = create_locks();

    assert!(locks.lock("alice", "res", 10_000).unwrap());
    assert!(!locks.unlock("bob", "res").unwrap());
    assert!(locks.is_locked("res").unwrap());

    assert!(locks.unlock("alice", "res").unwrap());
    assert!(!locks.is_locked("res").unwrap());
    assert!(locks.store().is_empty());
}

#[test]
fn test_unlock_with_wrong_owner_leaves_object_unchanged() {
    let locks = create_locks();
    assert!(locks.lock("alice", "res", 10_000).unwrap());
    let before = locks.store().get(BUCKET, "res.lock").unwrap();

    assert!(!locks.unlock("bob", "res").unwrap());
    assert_eq!(locks.store().get(BUCKET, "res.lock").unwrap(), before);
}

#[test]
fn test_unlock_of_unlocked_resource_returns_false() {
    let locks = create_locks();
    assert!(!locks.unlock("alice", "res").unwrap());
}

#[test]
fn test_owner_can_unlock_expired_record() {
    let locks = create_locks();
    put_record(&locks, &expired_record("alice", "res"));

    assert!(locks.is_owned("alice", "res").unwrap());
    assert!(locks.unlock("alice", "res").unwrap());
    assert!(locks.read_record("res").unwrap().is_none());
}

#[test]
fn test_owner_comparison_is_exact() {
    let locks = create_locks();
    assert!(locks.lock("alice", "res", 10_000).unwrap());

    assert!(!locks.is_owned("Alice", "res").unwrap());
    assert!(!locks.is_owned("alice ", "res").unwrap());
    assert!(locks.is_owned("alice", "res").unwrap());
}

#[test]
fn test_will_be_locked_for_threshold() {
    let locks = create_locks();
    let expires_at = format_timestamp(Utc::now() + Duration::seconds(10));
    put_record(
        &locks,
        &LockRecord::with_expires_at("alice", "res", 10_000, Some(expires_at)),
    );

    assert!(
        locks
            .is_owned_and_will_be_locked_for("alice", "res", 0)
            .unwrap()
    );
    assert!(
        locks
            .is_owned_and_will_be_locked_for("alice", "res", 5_000)
            .unwrap()
    );
    assert!(
        !locks
            .is_owned_and_will_be_locked_for("alice", "res", 20_000)
            .unwrap()
    );
    assert!(
        !locks
            .is_owned_and_will_be_locked_for("bob", "res", 0)
            .unwrap()
    );
}

#[test]
fn test_will_be_locked_for_expired_record() {
    let locks = create_locks();
    put_record(&locks, &expired_record("alice", "res"));

    assert!(
        !locks
            .is_owned_and_will_be_locked_for("alice", "res", 0)
            .unwrap()
    );
}

#[test]
fn test_malformed_record_is_an_error() {
    let locks = create_locks();
    locks.store().put(BUCKET, "res.lock", b"garbage").unwrap();

    for result in [
        locks.is_locked("res"),
        locks.lock("alice", "res", 1000),
        locks.unlock("alice", "res"),
        locks.is_owned("alice", "res"),
    ] {
        assert!(matches!(result, Err(LockError::MalformedRecord(_))));
    }

    // The corrupt object is left in place
    assert_eq!(locks.store().get(BUCKET, "res.lock").unwrap(), b"garbage");
}

#[test]
fn test_offset_timestamp_cannot_be_taken_over() {
    let locks = create_locks();
    let expires_at = (Utc::now() + Duration::hours(1))
        .with_timezone(&chrono::FixedOffset::west_opt(5 * 3600).unwrap())
        .to_rfc3339_opts(chrono::SecondsFormat::Micros, false);
    let payload = format!(
        r#"{{"lock_owner":"alice","resource_name":"res","duration_ms":3600000,"expires_at":"{}"}}"#,
        expires_at
    );
    locks
        .store()
        .put(BUCKET, "res.lock", payload.as_bytes())
        .unwrap();

    assert!(matches!(
        locks.lock("bob", "res", 1000),
        Err(LockError::MalformedRecord(_))
    ));
    assert_eq!(
        locks.store().get(BUCKET, "res.lock").unwrap(),
        payload.as_bytes()
    );
}

#[test]
fn test_whole_second_timestamp_from_other_clients() {
    let locks = create_locks();
    let expires_at = (Utc::now() + Duration::minutes(10))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let payload = format!(
        r#"{{"lock_owner":"alice","resource_name":"res","duration_ms":600000,"expires_at":"{}"}}"#,
        expires_at
    );
    locks
        .store()
        .put(BUCKET, "res.lock", payload.as_bytes())
        .unwrap();

    assert!(locks.is_locked("res").unwrap());
    assert!(!locks.lock("bob", "res", 1000).unwrap());
    assert!(
        locks
            .is_owned_and_will_be_locked_for("alice", "res", 60_000)
            .unwrap()
    );
}

#[test]
fn test_store_errors_propagate() {
    let locks = LockStore::new(UnavailableStore, BUCKET, "", ".lock").unwrap();

    let err = locks.is_locked("res").unwrap_err();
    assert!(matches!(err, LockError::Store(StoreError::Other(_))));
    assert!(err.to_string().contains("service unavailable"));

    assert!(matches!(
        locks.lock("alice", "res", 1000),
        Err(LockError::Store(_))
    ));
    assert!(matches!(
        locks.unlock("alice", "res"),
        Err(LockError::Store(_))
    ));
}

#[test]
fn test_try_acquire_guard_releases_on_drop() {
    let locks = create_locks();

    {
        let guard = locks.try_acquire("alice", "res", 10_000).unwrap().unwrap();
        assert_eq!(guard.owner(), "alice");
        assert_eq!(guard.resource(), "res");
        assert!(guard.is_held_for(1000).unwrap());
        assert!(locks.try_acquire("bob", "res", 10_000).unwrap().is_none());
    }

    assert!(!locks.is_locked("res").unwrap());
    assert!(locks.store().is_empty());
}

#[test]
fn test_guard_manual_release() {
    let locks = create_locks();
    let guard = locks.try_acquire("alice", "res", 10_000).unwrap().unwrap();

    assert!(guard.release().unwrap());
    assert!(locks.read_record("res").unwrap().is_none());
}

#[test]
fn test_guard_does_not_release_someone_elses_lock() {
    let locks = create_locks();
    let guard = locks.try_acquire("alice", "res", 10_000).unwrap().unwrap();

    // Alice's lock expired and Bob took over
    put_record(&locks, &expired_record("alice", "res"));
    assert!(locks.lock("bob", "res", 10_000).unwrap());

    assert!(!guard.is_held_for(0).unwrap());
    assert!(!guard.release().unwrap());
    assert!(locks.is_owned("bob", "res").unwrap());
}

#[test]
fn test_force_unlock() {
    let locks = create_locks();
    assert!(locks.force_unlock("res").unwrap().is_none());

    assert!(locks.lock("alice", "res", 10_000).unwrap());
    let cleared = locks.force_unlock("res").unwrap().unwrap();
    assert_eq!(cleared.owner(), "alice");
    assert!(!locks.is_locked("res").unwrap());
}

#[test]
fn test_force_unlock_clears_malformed_object() {
    let locks = create_locks();
    locks.store().put(BUCKET, "res.lock", b"{}").unwrap();

    assert!(locks.force_unlock("res").unwrap().is_none());
    assert!(locks.store().is_empty());
}

#[test]
fn test_clients_share_state_through_store() {
    let store = Arc::new(MemoryStore::new());
    let host_a = LockStore::new(Arc::clone(&store), BUCKET, "", ".lock").unwrap();
    let host_b = LockStore::new(Arc::clone(&store), BUCKET, "", ".lock").unwrap();

    assert!(host_a.lock("alice", "res", 10_000).unwrap());
    assert!(host_b.is_locked("res").unwrap());
    assert!(!host_b.lock("bob", "res", 10_000).unwrap());
    assert!(!host_b.unlock("bob", "res").unwrap());
    assert!(host_b.unlock("alice", "res").unwrap());
    assert!(!host_a.is_locked("res").unwrap());
}

#[test]
fn test_concurrent_lock_attempts_leave_one_record() {
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let locks = LockStore::new(store, BUCKET, "", ".lock").unwrap();
                let owner = format!("worker-{}", i);
                let acquired = locks.lock(&owner, "res", 60_000).unwrap();
                (owner, acquired)
            })
        })
        .collect();

    let results: Vec<(String, bool)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<&String> = results
        .iter()
        .filter(|(_, acquired)| *acquired)
        .map(|(owner, _)| owner)
        .collect();

    // Several callers may believe they won; exactly one record survives and
    // it belongs to one of them.
    assert!(!winners.is_empty());
    let locks = LockStore::new(Arc::clone(&store), BUCKET, "", ".lock").unwrap();
    let record = locks.read_record("res").unwrap().unwrap();
    assert!(winners.iter().any(|owner| owner.as_str() == record.owner()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_protocol_over_filesystem_store() {
    let temp_dir = TempDir::new().unwrap();
    let locks =
        LockStore::new(FilesystemStore::new(temp_dir.path()), BUCKET, "", ".lock").unwrap();

    assert!(!locks.is_locked("res").unwrap());
    assert!(locks.lock("alice", "res", 10_000).unwrap());
    assert!(temp_dir.path().join(BUCKET).join("res.lock").exists());
    assert!(!locks.lock("bob", "res", 10_000).unwrap());
    assert!(!locks.unlock("bob", "res").unwrap());
    assert!(locks.unlock("alice", "res").unwrap());
    assert!(!temp_dir.path().join(BUCKET).join("res.lock").exists());
}

#[test]
fn test_dot_resource_over_filesystem_store() {
    let temp_dir = TempDir::new().unwrap();
    let locks =
        LockStore::new(FilesystemStore::new(temp_dir.path()), BUCKET, "", ".lock").unwrap();

    assert!(!locks.is_locked(".env").unwrap());
    assert!(locks.lock("alice", ".env", 10_000).unwrap());
    assert!(temp_dir.path().join(BUCKET).join(".env.lock").exists());
    assert!(locks.is_owned("alice", ".env").unwrap());
    assert!(locks.unlock("alice", ".env").unwrap());
    assert!(!locks.is_locked(".env").unwrap());
}
