// ABOUTME: Process-wide monotonic UTC clock with microsecond resolution
// ABOUTME: Guarantees strictly increasing timestamps and a sortable storage encoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_MICROS: AtomicI64 = AtomicI64::new(0);

/// Current time, strictly greater than any value previously returned
///
/// If the wall clock stalls or steps backwards the result advances by one
/// microsecond past the last issued timestamp.
#[must_use]
pub fn now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_micros();
    let issued = match LAST_MICROS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(wall.max(last + 1))
    }) {
        Ok(last) | Err(last) => wall.max(last + 1),
    };
    DateTime::from_timestamp_micros(issued).unwrap_or_else(Utc::now)
}

/// Fixed-width RFC 3339 encoding; lexical order equals chronological order
#[must_use]
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns the chrono parse error for malformed values
pub fn from_storage(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_strictly_increasing() {
        let mut previous = now();
        for _ in 0..1_000 {
            let next = now();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_storage_round_trip_preserves_order() {
        let a = now();
        let b = now();
        let (sa, sb) = (to_storage(&a), to_storage(&b));
        assert!(sa < sb);
        assert_eq!(from_storage(&sa).unwrap(), a);
    }
}
