//! API datetime format
//!
//! The API speaks `"2021-07-02 13:19:18"`: ISO 8601 with a space separator,
//! no sub-second precision, no timezone (server local time).

use chrono::NaiveDateTime;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a datetime for the API, truncating sub-second precision.
pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATE_FORMAT).to_string()
}

/// Parse a datetime string from the API.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime() {
        let datetime = parse_datetime("2021-07-02 13:19:18").unwrap();
        assert_eq!(format_datetime(&datetime), "2021-07-02 13:19:18");

        let with_micros = datetime + chrono::Duration::microseconds(300700);
        assert_eq!(format_datetime(&with_micros), "2021-07-02 13:19:18");
    }

    #[test]
    fn test_parse_datetime_rejects_other_formats() {
        assert!(parse_datetime("2021-07-02T13:19:18").is_err());
        assert!(parse_datetime("not a date").is_err());
    }
}
