//! Calendar-date helpers. Every date at the system boundary is `YYYY-MM-DD`.

use chrono::{Datelike, Days, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Inclusive-inclusive day ranges overlap iff `s1 <= e2 && s2 <= e1`.
pub fn ranges_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
    s1 <= e2 && s2 <= e1
}

/// First and last day of the given month, or `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first
        .checked_add_months(chrono::Months::new(1))?
        .checked_sub_days(Days::new(1))?;
    Some((first, last))
}

pub fn all_days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    match month_bounds(year, month) {
        Some((first, last)) => days_in_range(first, last),
        None => Vec::new(),
    }
}

/// Every day from `start` to `end`, both included.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// `(year, month)` of the month before the given one.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// `(year, month)` of the month after the given one.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn current_month() -> (i32, u32) {
    let t = today();
    (t.year(), t.month())
}
