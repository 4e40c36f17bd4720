//! Best-effort date parsing for transaction grouping.
//!
//! Grouping by date must not over-fragment baskets, so values carrying a
//! time-of-day are truncated to the calendar day. Unparseable values fall
//! back to the raw trimmed string.

use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Returns the `YYYY-MM-DD` calendar day for a date or datetime string, or
/// `None` when the value matches no known format.
pub fn calendar_day(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(dt) = parse_naive_datetime(trimmed) {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    parse_naive_date(trimmed).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_day_truncates_time_of_day() {
        assert_eq!(
            calendar_day("2024-05-06 14:30:00").as_deref(),
            Some("2024-05-06")
        );
        assert_eq!(
            calendar_day("2024-05-06T09:00").as_deref(),
            Some("2024-05-06")
        );
    }

    #[test]
    fn calendar_day_accepts_multiple_date_formats() {
        assert_eq!(calendar_day("06/05/2024").as_deref(), Some("2024-05-06"));
        assert_eq!(calendar_day("2024/05/06").as_deref(), Some("2024-05-06"));
    }

    #[test]
    fn calendar_day_rejects_non_dates() {
        assert_eq!(calendar_day("not a date"), None);
        assert_eq!(calendar_day("   "), None);
    }
}
