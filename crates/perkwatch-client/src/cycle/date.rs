use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{CycleError, CycleResult};

const NEVER_EXPIRES_YEAR: i32 = 2099;
const NEVER_EXPIRES_MONTH: u32 = 12;
const NEVER_EXPIRES_DAY: u32 = 31;

/// Fixed far-future date used as both cycle end and reset for benefits that
/// have no recurring cycle (one-time and per-trip perks).
pub fn never_expires() -> NaiveDate {
    NaiveDate::from_ymd_opt(NEVER_EXPIRES_YEAR, NEVER_EXPIRES_MONTH, NEVER_EXPIRES_DAY)
        .unwrap_or(NaiveDate::MAX)
}

/// Drops the time of day from a captured "now"; all cycle math is date-only.
pub fn reference_date_of(timestamp: NaiveDateTime) -> NaiveDate {
    timestamp.date()
}

/// The last second of `date`, for callers that present inclusive cycle ends
/// as timestamps.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    date.and_time(last_second)
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !looks_like_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses either a plain ISO date or an RFC 3339 timestamp. For timestamps
/// the calendar date written in the string is kept.
pub fn parse_iso_date_or_timestamp(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Some(date) = parse_iso_date(trimmed) {
        return Some(date);
    }
    if let Some(prefix) = trimmed.get(..10)
        && trimmed.len() > 10
        && looks_like_iso_date(prefix)
    {
        return DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|timestamp| timestamp.date_naive());
    }
    None
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// Longest length a month can have in any year (February counts as 29).
pub fn max_days_in_month(month: u32) -> u32 {
    if month == 2 { 29 } else { days_in_month(2000, month) }
}

/// Builds a date, pulling `day` back to the end of the month when the month
/// is shorter in `year` (Feb 29 becomes Feb 28 outside leap years).
pub fn clamped_date(year: i32, month: u32, day: u32) -> CycleResult<NaiveDate> {
    let clamped_day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, clamped_day).ok_or_else(|| {
        CycleError::configuration(format!(
            "cannot build a date from year {year}, month {month}, day {day}"
        ))
    })
}

pub fn first_day_of_month(date: NaiveDate) -> CycleResult<NaiveDate> {
    clamped_date(date.year(), date.month(), 1)
}

pub fn last_day_of_month(date: NaiveDate) -> CycleResult<NaiveDate> {
    clamped_date(date.year(), date.month(), days_in_month(date.year(), date.month()))
}

pub fn next_day(date: NaiveDate) -> CycleResult<NaiveDate> {
    date.succ_opt().ok_or_else(|| {
        CycleError::configuration(format!(
            "date {} is at the end of the supported range",
            format_iso_date(&date)
        ))
    })
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}
