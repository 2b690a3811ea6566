// src/feed/dates.rs

//! Normalization of the date strings stored in indexed documents.
//!
//! Documents carry dates at several precisions (`2021`, `2021-03`,
//! `2021-03-04`, `2021-03-04T10:00`, `2021-03-04T10:00:00.000+01:00`, ...).
//! Each input is matched against the supported layouts from the most to the
//! least specific one and the first match wins.
//!
//! The year `0000` is a placeholder for "year unknown". Such inputs are
//! parsed as if they were in 1970 and moved to year 1 in their own offset,
//! so month, day and wall-clock time are kept as written.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

const SENTINEL_YEAR: &str = "0000";
const STAND_IN_YEAR: &str = "1970";
const UNKNOWN_YEAR: i32 = 1;

/// Layouts carrying an explicit offset. A trailing `Z` is rewritten to
/// `+00:00` before matching.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Layouts without offset, read as UTC.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Granularity of the source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
    DateTime,
}

/// A parsed date, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDate {
    pub instant: DateTime<Utc>,
    pub precision: DatePrecision,
}

/// Normalize an optional date string. `None`, blank and unparsable inputs
/// all yield `None`.
pub fn normalize(input: Option<&str>) -> Option<NormalizedDate> {
    input.and_then(normalize_str)
}

/// Normalize a date string.
pub fn normalize_str(input: &str) -> Option<NormalizedDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    // The year is replaced on the date as written, before moving to UTC.
    let parsed = match input.strip_prefix(SENTINEL_YEAR) {
        Some(rest) => parse_layouts(&format!("{STAND_IN_YEAR}{rest}"))
            .and_then(|(date, precision)| Some((date.with_year(UNKNOWN_YEAR)?, precision))),
        None => parse_layouts(input),
    };

    let normalized = parsed.map(|(date, precision)| NormalizedDate {
        instant: date.with_timezone(&Utc),
        precision,
    });
    if normalized.is_none() {
        log::debug!("Ignoring unparsable date '{}'", input);
    }
    normalized
}

/// A match in the writer's own offset (UTC for layouts without one).
type Parsed = (DateTime<FixedOffset>, DatePrecision);

fn parse_layouts(input: &str) -> Option<Parsed> {
    parse_with_offset(input)
        .or_else(|| parse_local(input))
        .or_else(|| parse_date(input))
        .or_else(|| parse_year_month(input))
        .or_else(|| parse_year(input))
}

fn parse_with_offset(input: &str) -> Option<Parsed> {
    let input = match input.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => input.to_string(),
    };
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&input, format).ok())
        .map(|dt| (dt, DatePrecision::DateTime))
}

fn parse_local(input: &str) -> Option<Parsed> {
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| (as_utc(&naive), DatePrecision::DateTime))
}

fn parse_date(input: &str) -> Option<Parsed> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|date| start_of(date, DatePrecision::Day))
}

fn parse_year_month(input: &str) -> Option<Parsed> {
    let (year, month) = input.split_once('-')?;
    let date = NaiveDate::from_ymd_opt(parse_year_digits(year)?, month.parse().ok()?, 1)?;
    // "2021-3" is not a supported layout
    (month.len() == 2).then(|| start_of(date, DatePrecision::Month))
}

fn parse_year(input: &str) -> Option<Parsed> {
    let date = NaiveDate::from_ymd_opt(parse_year_digits(input)?, 1, 1)?;
    Some(start_of(date, DatePrecision::Year))
}

fn parse_year_digits(input: &str) -> Option<i32> {
    if input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit()) {
        input.parse().ok()
    } else {
        None
    }
}

fn as_utc(naive: &NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(naive).fixed_offset()
}

fn start_of(date: NaiveDate, precision: DatePrecision) -> Parsed {
    (as_utc(&date.and_time(NaiveTime::default())), precision)
}
