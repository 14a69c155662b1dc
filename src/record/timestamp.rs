//! Comparable UTC timestamps.
//!
//! Lock expiry is stored and compared as text, so every timestamp written by
//! this crate has the same fixed-width shape: `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
//! For those strings lexicographic order is chronological order.

use chrono::{DateTime, Datelike, SecondsFormat, TimeDelta, Utc};

/// Latest representable timestamp. Expiries beyond year 9999 clamp to this
/// value because a five-digit year would break string ordering.
pub const MAX_TIMESTAMP: &str = "9999-12-31T23:59:59.999999Z";

/// Format an instant in the comparable representation.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    if at.year() > 9999 {
        return MAX_TIMESTAMP.to_string();
    }
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// The current UTC time in the comparable representation.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// `from + ms` in the comparable representation, saturating at
/// [`MAX_TIMESTAMP`].
pub fn timestamp_after(from: DateTime<Utc>, ms: u64) -> String {
    let later = i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| from.checked_add_signed(delta));

    match later {
        Some(at) => format_timestamp(at),
        None => MAX_TIMESTAMP.to_string(),
    }
}

/// Parse an RFC3339 timestamp back into an instant.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Rewrite a UTC (`Z`) RFC3339 timestamp of any precision into the
/// comparable representation.
///
/// Returns `None` for anything else, including timestamps with a numeric
/// offset: their text does not sort with UTC timestamps.
pub fn canonical_timestamp(s: &str) -> Option<String> {
    if !s.ends_with('Z') {
        return None;
    }
    parse_timestamp(s).map(format_timestamp)
}
