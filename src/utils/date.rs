//! Date parsing for document metadata.
//!
//! Header `date` values follow the `YYYY-MM-DD` convention, optionally with
//! a time part. Filename inference reuses the same date-only form.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse a `date` tag value.
///
/// Accepted forms: `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`, and
/// `YYYY-MM-DD HH:MM:SS`. The time part is dropped.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = value.parse::<NaiveDate>() {
        return Some(date);
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Try to interpret a file stem as a date (`2016-06-22.md` → 2016-06-22).
pub fn date_from_stem(stem: &str) -> Option<NaiveDate> {
    stem.parse::<NaiveDate>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_plain() {
        assert_eq!(
            parse_date("2016-06-22"),
            NaiveDate::from_ymd_opt(2016, 6, 22)
        );
        assert_eq!(
            parse_date("  2016-06-22  "),
            NaiveDate::from_ymd_opt(2016, 6, 22)
        );
    }

    #[test]
    fn test_parse_date_with_time() {
        assert_eq!(
            parse_date("2024-01-15T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15 10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_date_from_stem() {
        assert_eq!(
            date_from_stem("2016-06-22"),
            NaiveDate::from_ymd_opt(2016, 6, 22)
        );
        assert_eq!(date_from_stem("notes"), None);
        assert_eq!(date_from_stem("2016-06-22-draft"), None);
    }
}
