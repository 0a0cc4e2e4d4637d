//! age.rs
//!
//! This module provides a calendar-aware elapsed time between two instants,
//! rendered as e.g. "4 years, 5 months and 5 days".
//!
//! Chrono does not provide a built-in year/month/day diff (unlike Python’s
//! relativedelta), so we count whole calendar months by advancing the earlier
//! instant, split them into years and months, and take the remainder in days.
//!
//! Advancing a date by months (chrono's `checked_add_months`) clamps the day
//! of month to the target month:
//!   • Jan 31 + 1 month  → Feb 28 (Feb 29 in leap years)
//!   • Feb 29 + 12 months → Feb 28 in non-leap years
//!   • time of day is kept as-is

use chrono::{DateTime, Datelike, Months, Utc};
use serde::Serialize;
use std::fmt;

/// Position of `from` relative to `to` in [`compute_delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Earlier,
    Later,
}

impl Sign {
    pub fn flip(self) -> Self {
        match self {
            Sign::Earlier => Sign::Later,
            Sign::Later => Sign::Earlier,
        }
    }
}

/// Years, months and days between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateDelta {
    pub years: u32,
    /// Always `0..=11`.
    pub months: u32,
    /// Always `0..=30`.
    pub days: u32,
    pub sign: Sign,
}

impl DateDelta {
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

/// Calendar breakdown between `from` and `to`.
///
/// `sign` is [`Sign::Later`] when `from` is at or after `to`, so the age of
/// an account is `compute_delta(now, created_at)`.
pub fn compute_delta(from: DateTime<Utc>, to: DateTime<Utc>) -> DateDelta {
    let (earlier, later, sign) = if from < to {
        (from, to, Sign::Earlier)
    } else {
        (to, from, Sign::Later)
    };

    // Start from the calendar month difference and step back until the
    // advanced instant no longer overshoots. Zero months never overshoots.
    let span = month_index(later) - month_index(earlier);
    let mut months = u32::try_from(span).unwrap_or(0);
    let anchor = loop {
        match add_months(earlier, months) {
            Some(anchor) if anchor <= later => break anchor,
            _ if months == 0 => break earlier,
            _ => months -= 1,
        }
    };

    let days = (later - anchor).num_days();

    DateDelta {
        years: months / 12,
        months: months % 12,
        days: days as u32,
        sign,
    }
}

/// Advance `instant` by `months` calendar months, clamping the day of month.
///
/// Returns `None` only when the result is outside chrono's representable range.
pub fn add_months(instant: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    instant.checked_add_months(Months::new(months))
}

/// Months since January of year 0 (proleptic Gregorian, so negative BCE).
fn month_index(instant: DateTime<Utc>) -> i64 {
    i64::from(instant.year()) * 12 + i64::from(instant.month0())
}

impl fmt::Display for DateDelta {
    /// Non-zero components, the last two joined with "and".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.years, "year"),
            (self.months, "month"),
            (self.days, "day"),
        ]
        .into_iter()
        .filter(|(n, _)| *n != 0)
        .map(|(n, unit)| format!("{n} {unit}{}", plural(n)))
        .collect();

        match parts.split_last() {
            None => Ok(()),
            Some((last, [])) => f.write_str(last),
            Some((last, rest)) => write!(f, "{} and {last}", rest.join(", ")),
        }
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Returns number of days in a given year/month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // should never occur but keeps function total
    }
}

/// Leap-year rule (Gregorian):
///   - divisible by 4 → leap year
///   - except divisible by 100 → not leap year
///   - except divisible by 400 → leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
