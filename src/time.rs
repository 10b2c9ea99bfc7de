//! Time related utils.

use chrono::Utc;

/// DateTime in UTC, the only time zone EdgeGrid signing ever deals with.
pub type DateTime = chrono::DateTime<Utc>;

/// Get the current time in UTC.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a time as an EdgeGrid timestamp: `20140321T19:34:21+0000`.
///
/// The `+0000` suffix is a literal. The clock is read in UTC, so no offset
/// computation ever happens.
pub fn format_timestamp(t: DateTime) -> String {
    t.format("%Y%m%dT%H:%M:%S+0000").to_string()
}
