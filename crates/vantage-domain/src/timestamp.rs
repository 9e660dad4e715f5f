//! Lenient timestamp parsing for stored row values
//!
//! Collectors write dates in whatever shape their upstream uses. Everything
//! without an explicit offset is taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Format used when the pipeline itself writes a timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

// Two-digit years first: `%Y` would also accept "24" as year 24.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Parse a stored timestamp, returning `None` when it cannot be dated
///
/// # Examples
///
/// ```
/// use vantage_domain::parse_timestamp;
///
/// assert!(parse_timestamp("2025-03-01 12:30:00").is_some());
/// assert!(parse_timestamp("2025-03-01T12:30:00+02:00").is_some());
/// assert!(parse_timestamp("2025-03-01").is_some());
/// assert!(parse_timestamp("N/A").is_none());
/// assert!(parse_timestamp("").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Format a timestamp the way the pipeline stores it
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
