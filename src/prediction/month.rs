//! Day-of-month sets for rendering a calendar month. Months are 1-based.

use chrono::{Datelike, NaiveDate};

use crate::dates::{add_days, in_month};

/// How many cycles past the anchor are replayed for the history view.
pub const HISTORY_CYCLES: i64 = 10;

fn days_in_month<I>(dates: I, month: u32, year: i32) -> Vec<u32>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut days: Vec<u32> = dates
        .into_iter()
        .filter(|date| in_month(*date, month, year))
        .map(|date| date.day())
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Days of the single predicted next period that fall in the month.
pub fn predicted_period_days_for_month(
    month: u32,
    year: i32,
    next_period_start: Option<NaiveDate>,
    period_length: i64,
) -> Vec<u32> {
    let Some(start) = next_period_start else {
        return Vec::new();
    };
    days_in_month((0..period_length).filter_map(|i| add_days(start, i)), month, year)
}

/// Fertile-window days (both ends inclusive) that fall in the month.
pub fn fertile_days_for_month(
    month: u32,
    year: i32,
    fertile_window_start: Option<NaiveDate>,
    fertile_window_end: Option<NaiveDate>,
) -> Vec<u32> {
    let (Some(start), Some(end)) = (fertile_window_start, fertile_window_end) else {
        return Vec::new();
    };
    days_in_month(start.iter_days().take_while(|d| *d <= end), month, year)
}

pub fn ovulation_day_for_month(
    month: u32,
    year: i32,
    predicted_ovulation: Option<NaiveDate>,
) -> Option<u32> {
    predicted_ovulation
        .filter(|date| in_month(*date, month, year))
        .map(|date| date.day())
}

/// Period days already lived through, for the history calendar.
///
/// Includes the whole anchor period, then replays up to ten cycles forward
/// from the anchor keeping only days on or before `today`.
pub fn period_days_for_month(
    month: u32,
    year: i32,
    last_period_start: Option<NaiveDate>,
    period_length: i64,
    cycle_length: i64,
    today: NaiveDate,
) -> Vec<u32> {
    let Some(anchor) = last_period_start else {
        return Vec::new();
    };

    // days past the end of the calendar are dropped
    let anchor_period = (0..period_length).filter_map(|i| add_days(anchor, i));
    let replayed = (1..=HISTORY_CYCLES)
        .filter_map(|n| add_days(anchor, n * cycle_length))
        .flat_map(|start| (0..period_length).filter_map(move |i| add_days(start, i)))
        .filter(|date| *date <= today);

    days_in_month(anchor_period.chain(replayed), month, year)
}
