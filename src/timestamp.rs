use chrono::{NaiveDate, NaiveDateTime, Timelike};

#[derive(thiserror::Error, Debug)]
#[error("row {row}: cannot parse pickup time {value:?}")]
pub struct TimestampError {
    pub row: usize,
    pub value: String,
}

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a pickup time and floors it to the hour
///
/// A bare date is read as midnight.
pub fn parse_hour(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .and_then(|t| t.with_nanosecond(0)?.with_second(0)?.with_minute(0))
}

pub fn format_hour(time: &NaiveDateTime) -> String {
    time.format(OUTPUT_FORMAT).to_string()
}

/// `YYYY-MM` key of the calendar month
pub fn month_key(time: &NaiveDateTime) -> String {
    time.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_forms() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .unwrap();
        for value in [
            "2023-01-01 08:00",
            "2023-01-01 08:00:00",
            "2023-01-01T08:00:00",
            "2023-01-01 08:59:59.250",
            " 2023-01-01 08:15 ",
        ] {
            assert_eq!(parse_hour(value), Some(expected), "{}", value);
        }
        assert_eq!(format_hour(&parse_hour("2023-02-03").unwrap()), "2023-02-03 00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_hour("yesterday"), None);
        assert_eq!(parse_hour("2023-13-01 08:00"), None);
    }

    #[test]
    fn month() {
        let t = parse_hour("2023-02-28 23:00").unwrap();
        assert_eq!(month_key(&t), "2023-02");
    }
}
