//! Calendar-date helpers. `NaiveDate` carries no time of day or zone, so
//! differences are whole days and unaffected by DST transitions.

use chrono::{Datelike, Duration, NaiveDate};

pub const ISO_FORMAT: &str = "%Y-%m-%d";

pub fn parse_iso(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// `None` when the result falls outside the representable calendar.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Signed number of days from `start` to `end`; negative when `end` is earlier.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

pub fn in_month(date: NaiveDate, month: u32, year: i32) -> bool {
    date.month() == month && date.year() == year
}

/// First and last day of a month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    Some((first_day, next_first.pred_opt()?))
}
