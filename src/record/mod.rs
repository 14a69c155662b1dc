//! Lock records: the value stored under a lock key.
//!
//! # Wire Format
//!
//! A record is a UTF-8 JSON object with exactly four fields:
//! - `lock_owner`: opaque owner identifier
//! - `resource_name`: the locked resource
//! - `duration_ms`: requested lock duration in milliseconds
//! - `expires_at`: comparable UTC timestamp, or `null`
//!
//! The field names are shared with independently versioned clients and must
//! not change.
//!
//! # Expiry
//!
//! `expires_at` is fixed when the record is constructed (`now + duration_ms`
//! unless given explicitly) and never changes afterwards. Expiry checks compare
//! timestamp strings directly; see [`timestamp`] for the representation.
//! Decoding rewrites other UTC precisions into that representation and
//! rejects timestamps with a numeric offset.

pub mod timestamp;


use crate::error::{LockError, Result};
use chrono::{TimeDelta, Utc};
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use timestamp::{canonical_timestamp, now_timestamp, parse_timestamp, timestamp_after};

/// The state of one lock.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockRecord {
    #[serde(rename = "lock_owner")]
    owner: String,

    #[serde(rename = "resource_name")]
    resource: String,

    duration_ms: u64,

    #[serde(default)]
    expires_at: Option<String>,
}

impl LockRecord {
    /// Create a record expiring `duration_ms` from now.
    pub fn new(owner: impl Into<String>, resource: impl Into<String>, duration_ms: u64) -> Self {
        Self::with_expires_at(owner, resource, duration_ms, None)
    }

    /// Create a record with an explicit expiry.
    ///
    /// When `expires_at` is `None` the expiry is computed as `now + duration_ms`.
    pub fn with_expires_at(
        owner: impl Into<String>,
        resource: impl Into<String>,
        duration_ms: u64,
        expires_at: Option<String>,
    ) -> Self {
        let expires_at = expires_at.or_else(|| Some(timestamp_after(Utc::now(), duration_ms)));
        Self {
            owner: owner.into(),
            resource: resource.into(),
            duration_ms,
            expires_at,
        }
    }

    /// Decode a record from its stored payload.
    ///
    /// `expires_at` must be a UTC timestamp ending in `Z`; other precisions
    /// (e.g. whole seconds) are rewritten into the comparable representation.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut record: LockRecord = serde_json::from_slice(bytes)
            .map_err(|e| LockError::MalformedRecord(e.to_string()))?;

        record.expires_at = record
            .expires_at
            .map(|raw| {
                canonical_timestamp(&raw).ok_or_else(|| {
                    LockError::MalformedRecord(format!(
                        "expires_at '{}' is not a UTC RFC3339 timestamp",
                        raw
                    ))
                })
            })
            .transpose()?;

        Ok(record)
    }

    /// Encode the record as its stored payload.
    pub fn encode(&self) -> Vec<u8> {
        json!({
            "lock_owner": self.owner,
            "resource_name": self.resource,
            "duration_ms": self.duration_ms,
            "expires_at": self.expires_at,
        })
        .to_string()
        .into_bytes()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }

    /// Whether the lock is still in force right now.
    pub fn is_locked(&self) -> bool {
        self.expires_after(&now_timestamp())
    }

    /// Whether `expires_at` is strictly later than the given timestamp.
    ///
    /// A record without an expiry never is.
    pub fn expires_after(&self, timestamp: &str) -> bool {
        self.expires_at
            .as_deref()
            .is_some_and(|expires_at| expires_at > timestamp)
    }

    /// Time left until expiry; zero once expired or when no expiry is set.
    pub fn remaining(&self) -> TimeDelta {
        self.expires_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|expires_at| expires_at.signed_duration_since(Utc::now()))
            .filter(|left| *left > TimeDelta::zero())
            .unwrap_or_else(TimeDelta::zero)
    }

    /// Format the remaining time as a human-readable string.
    pub fn remaining_string(&self) -> String {
        let left = self.remaining();
        let hours = left.num_hours();
        let minutes = left.num_minutes();
        let seconds = left.num_seconds();

        if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}ms", left.num_milliseconds())
        }
    }
}

impl fmt::Display for LockRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (owner: {}, expires: {}, remaining: {}{})",
            self.resource,
            self.owner,
            self.expires_at.as_deref().unwrap_or("unset"),
            self.remaining_string(),
            if self.is_locked() { "" } else { ", EXPIRED" }
        )
    }
}
