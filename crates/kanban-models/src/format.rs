//! Display helpers and lenient timestamp parsing.
//!
//! The server emits timestamps either as RFC 3339 strings or as naive
//! local date-times without an offset. Both are accepted and treated as
//! UTC; plain `YYYY-MM-DD` dates are accepted for due dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses a server timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp as a short date, e.g. `Jan 5, 2026`.
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Formats a timestamp as a short date with time, e.g. `Jan 5, 2026, 09:30 AM`.
pub fn format_date_time(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Formats a raw due date string, falling back to the raw value when it
/// cannot be parsed.
pub fn format_due_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|at| format_date(&at))
        .unwrap_or_else(|| raw.to_string())
}

/// Returns up to two upper-cased initials for a display name.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Serde adapter for [`DateTime<Utc>`] fields that uses [`parse_timestamp`].
pub(crate) mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
