//! crates/exercise_tracker_core/src/dates.rs
//!
//! Date normalization for client-supplied dates.
//!
//! A raw value is first parsed as a calendar date or timestamp. If that fails,
//! whitespace is stripped and a run of 1 to 13 digits is read as Unix epoch
//! milliseconds. Anything else has no date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rendering used for every date sent back to clients, e.g. `Mon Jan 02 2023`.
pub const DATE_STRING_FORMAT: &str = "%a %b %d %Y";

/// What a missing date renders as.
pub const INVALID_DATE: &str = "Invalid Date";

static EPOCH_MILLIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,13}$").expect("epoch pattern is valid"));

// A leading day name is informational only; the date after it decides.
static WEEKDAY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3,9},?\s+(.+)$").expect("weekday pattern is valid"));

static ISO_YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})(?:-([0-9]{2}))?$").expect("year pattern is valid"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Resolves the date of a new exercise.
///
/// Absent or blank input means "now". Present input that fails both parsing
/// paths yields `None`.
pub fn normalize_date(raw: Option<&str>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match raw {
        None => Some(now),
        Some(value) if value.trim().is_empty() => Some(now),
        Some(value) => parse_date(value),
    }
}

/// Parses a date directly, falling back to the epoch-milliseconds heuristic.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_direct(raw.trim()).or_else(|| parse_epoch_millis(raw))
}

/// Renders a stored date for API responses.
pub fn to_date_string(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format(DATE_STRING_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_direct(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    if let Some(captures) = ISO_YEAR_MONTH.captures(value) {
        let year = captures[1].parse::<i32>().ok()?;
        let month = match captures.get(2) {
            Some(month) => month.as_str().parse::<u32>().ok()?,
            None => 1,
        };
        return NaiveDate::from_ymd_opt(year, month, 1).map(start_of_day);
    }

    parse_naive(value)
        .or_else(|| {
            // `2023-01-01T10:00Z`: a UTC suffix without seconds.
            value
                .strip_suffix(['Z', 'z'])
                .and_then(|rest| parse_naive(rest).filter(|_| rest.contains('T')))
        })
        .or_else(|| {
            let captures = WEEKDAY_PREFIX.captures(value)?;
            let rest = captures.get(1)?.as_str();
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(rest, format).ok())
                .map(start_of_day)
        })
}

fn parse_naive(value: &str) -> Option<DateTime<Utc>> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .map(start_of_day)
        })
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if !EPOCH_MILLIS.is_match(&digits) {
        return None;
    }
    let millis = digits.parse::<i64>().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
