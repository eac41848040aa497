//! Date parsing for raw birth and analysis dates.

use chrono::NaiveDate;

/// Parses a date with the single accepted format.
///
/// Surrounding whitespace is ignored. Empty input, text that does not match
/// `format`, and impossible dates (e.g. February 30th) yield `None`.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, format).ok()
}
