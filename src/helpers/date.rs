//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format an ISO-8601 date string for display, e.g. "January 1, 2024".
///
/// Accepts a plain date, a date-time, or RFC 3339. Anything else is
/// returned unchanged.
pub fn display_date(value: &str) -> String {
    const DISPLAY: &str = "%B %-d, %Y";
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format(DISPLAY).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format(DISPLAY).to_string();
    }

    let formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return dt.format(DISPLAY).to_string();
        }
    }

    value.to_string()
}

/// Today's date as stored in new posts
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
