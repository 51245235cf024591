//! Shared timestamp parsing for portal responses.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses a Socrata floating timestamp (ISO 8601 without offset, optional
/// fractional seconds).
#[must_use]
pub fn parse_socrata_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Parses the `dataUpdatedAt` field of the metadata API, which carries an
/// offset (`Z` or `+00:00`). Falls back to the floating form.
#[must_use]
pub fn parse_data_updated_at(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    parse_socrata_date(s)
}
