//! Calendar arithmetic and URL building for the month/day walk

use chrono::{Datelike, Months, NaiveDate};

/// Every first-of-month from `start` to `end`, both inclusive
///
/// `start` is normalized to the first of its month, so the range always
/// contains whole months. A month is included when its first day is not
/// after `end`.
pub fn month_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut current = start.with_day(1);

    while let Some(month) = current {
        if month > end {
            break;
        }
        months.push(month);
        current = month.checked_add_months(Months::new(1));
    }

    months
}

/// Number of days in the given month, leap years included
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(0)
}

/// Every date of the given month in order
pub fn days_of_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    (1..=days_in_month(year, month)).filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
}

/// URL of the calendar page for one month
pub fn build_calendar_url(base_url: &str, year: i32, month: u32) -> String {
    format!(
        "{}index.php?mid=calendar&pYear={}&pMonth={}",
        base_url, year, month
    )
}

/// Element id of a day's container on the calendar page (no zero padding)
pub fn day_container_id(day: NaiveDate) -> String {
    format!(
        "day_schedule_container_{}-{}-{}",
        day.year(),
        day.month(),
        day.day()
    )
}
