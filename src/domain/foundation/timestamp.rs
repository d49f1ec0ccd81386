//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
///
/// Stance and principle versions record when they were established with one
/// of these; the value serializes as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn at(secs: i64) -> Timestamp {
        Timestamp(Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn now_lies_between_surrounding_clock_reads() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.0 >= before);
        assert!(ts.0 <= after);
    }

    #[test]
    fn wraps_the_given_instant() {
        // 2024-01-15T00:00:00Z
        let ts = at(1_705_276_800);
        assert_eq!(ts.0.year(), 2024);
        assert_eq!(ts.0.month(), 1);
        assert_eq!(ts.0.day(), 15);
    }

    #[test]
    fn ordering_follows_time() {
        assert!(at(1_000) < at(2_000));
    }

    #[test]
    fn serializes_as_rfc3339() {
        let ts = at(1_705_276_800);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15T00:00:00"));

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
