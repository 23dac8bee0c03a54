//! Timestamp encoding for TEXT columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision (`2026-08-07T09:15:00.000000Z`), so lexicographic
//! comparison in SQL equals chronological comparison.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Result;

pub fn encode(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
