//! Exit code constants for the bucketlock CLI.
//!
//! - 0: Success (the queried or requested lock condition holds)
//! - 1: User error (bad args, invalid config)
//! - 2: Lock held / not owned (the boolean operation returned false)
//! - 3: Object store failure
//! - 4: Malformed lock record

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The lock operation answered `false`: already locked, not owned, or not
/// locked for long enough.
pub const LOCK_HELD: i32 = 2;

/// The object store reported a failure other than "not found".
pub const STORE_FAILURE: i32 = 3;

/// A lock object exists but could not be decoded.
pub const MALFORMED_RECORD: i32 = 4;
