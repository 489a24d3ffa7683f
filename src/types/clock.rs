//! Wall-clock parsing and formatting.
//!
//! Times are stored and exchanged as `HH:MM`. Inputs with a trailing seconds
//! component (`HH:MM:SS`) are accepted and truncated to the minute, matching
//! how the booking form has always written the ledger.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::RouteError;

/// Ledger date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ledger time format.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a time of day (`HH:MM` or `HH:MM:SS`) truncated to minute precision.
pub fn parse_time(raw: &str) -> Result<NaiveTime, RouteError> {
    let trimmed = raw.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| RouteError::MalformedInput(format!("invalid time '{raw}', expected HH:MM")))?;
    truncate_to_minute(parsed)
        .ok_or_else(|| RouteError::MalformedInput(format!("invalid time '{raw}'")))
}

/// Parse a calendar date (`YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, RouteError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        RouteError::MalformedInput(format!("invalid date '{raw}', expected YYYY-MM-DD"))
    })
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn truncate_to_minute(time: NaiveTime) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
}

/// Serde adapter for `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_minutes() {
        let t = parse_time("09:30").unwrap();
        assert_eq!(format_time(t), "09:30");
    }

    #[test]
    fn test_parse_time_truncates_seconds() {
        let t = parse_time("14:05:59").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(14, 5, 0).unwrap());
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(matches!(parse_time("9h"), Err(RouteError::MalformedInput(_))));
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("2024-03-15").unwrap();
        assert_eq!(format_date(d), "2024-03-15");
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_lexical_order_matches_time_order() {
        // The ledger sorts on the HH:MM string; zero padding keeps it chronological.
        let early = format_time(parse_time("09:05:30").unwrap());
        let late = format_time(parse_time("10:00").unwrap());
        assert_eq!(early, "09:05");
        assert!(early < late);
    }
}
