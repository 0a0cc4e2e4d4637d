//! Next yearly recurrence of a date's month and day.
//!
//! Only the (month, day) pair is compared; the time of day never decides
//! whether the anniversary has passed. A Feb 29 date recurs on Feb 28 in
//! non-leap years, the same clamp [`crate::age::add_months`] applies.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::age::{DateDelta, compute_delta, days_in_month};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnniversaryResult {
    pub next_occurrence: DateTime<Utc>,
    /// Calendar distance from today to the anniversary.
    pub delta: DateDelta,
    pub days_until: u32,
    /// Which anniversary comes next (1 for the first birthday).
    pub number: u32,
}

impl AnniversaryResult {
    pub fn is_today(&self) -> bool {
        self.days_until == 0
    }
}

/// The first date on or after `now` sharing `original`'s month and day.
///
/// Keeps `original`'s time of day.
pub fn next_occurrence(original: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let out_of_range = || {
        Error::InvalidInput(format!(
            "no anniversary of {original} after {now} within the supported calendar"
        ))
    };

    let candidate = occurrence_in(original, now.year()).ok_or_else(out_of_range)?;
    if (candidate.month(), candidate.day()) < (now.month(), now.day()) {
        occurrence_in(original, now.year() + 1).ok_or_else(out_of_range)
    } else {
        Ok(candidate)
    }
}

/// Next anniversary of `original` together with the countdown to it.
pub fn project(original: DateTime<Utc>, now: DateTime<Utc>) -> Result<AnniversaryResult> {
    let next = next_occurrence(original, now)?;

    let today = midnight(now.date_naive());
    let day = midnight(next.date_naive());
    let days_until = (day - today).num_days();

    Ok(AnniversaryResult {
        next_occurrence: next,
        delta: compute_delta(today, day),
        days_until: days_until as u32,
        number: (next.year() - original.year()).max(0) as u32,
    })
}

fn occurrence_in(original: DateTime<Utc>, year: i32) -> Option<DateTime<Utc>> {
    let day = original.day().min(days_in_month(year, original.month()));
    let date = NaiveDate::from_ymd_opt(year, original.month(), day)?;
    Some(date.and_time(original.time()).and_utc())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::Sign;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn same_day_is_today() {
        assert_eq!(
            next_occurrence(at(2000, 3, 10), at(2024, 3, 10)).unwrap(),
            at(2024, 3, 10)
        );
    }

    #[test]
    fn passed_anniversary_moves_to_next_year() {
        assert_eq!(
            next_occurrence(at(2000, 3, 10), at(2024, 4, 1)).unwrap(),
            at(2025, 3, 10)
        );
        assert_eq!(
            next_occurrence(at(2000, 3, 10), at(2024, 3, 11)).unwrap(),
            at(2025, 3, 10)
        );
    }

    #[test]
    fn upcoming_anniversary_stays_this_year() {
        assert_eq!(
            next_occurrence(at(2000, 3, 10), at(2024, 1, 1)).unwrap(),
            at(2024, 3, 10)
        );
    }

    #[test]
    fn time_of_day_is_ignored() {
        let original = Utc.with_ymd_and_hms(2010, 6, 1, 23, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap();
        let next = next_occurrence(original, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap());

        let original = Utc.with_ymd_and_hms(2010, 6, 1, 1, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap();
        assert_eq!(next_occurrence(original, now).unwrap().date_naive(), now.date_naive());
    }

    #[test]
    fn leap_day_clamps_to_feb_28() {
        let original = at(2016, 2, 29);
        assert_eq!(next_occurrence(original, at(2023, 1, 5)).unwrap(), at(2023, 2, 28));
        assert_eq!(next_occurrence(original, at(2023, 2, 28)).unwrap(), at(2023, 2, 28));
        assert_eq!(next_occurrence(original, at(2023, 3, 1)).unwrap(), at(2024, 2, 29));
        assert_eq!(next_occurrence(original, at(2024, 3, 1)).unwrap(), at(2025, 2, 28));
    }

    #[test]
    fn never_before_now_and_keeps_month_day() {
        let originals = [at(2009, 1, 1), at(2011, 7, 19), at(2013, 12, 31)];
        let start = at(2023, 11, 15);
        for original in originals {
            for offset in 0..400 {
                let now = start + chrono::Duration::days(offset);
                let next = next_occurrence(original, now).unwrap();
                assert!(next.date_naive() >= now.date_naive());
                assert_eq!((next.month(), next.day()), (original.month(), original.day()));
            }
        }
    }

    #[test]
    fn projection_counts_down() {
        let result = project(at(2010, 3, 21), Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap())
            .unwrap();
        assert_eq!(result.next_occurrence, at(2024, 3, 21));
        assert_eq!(result.days_until, 20);
        assert_eq!(result.number, 14);
        assert_eq!(result.delta.sign, Sign::Earlier);
        assert_eq!(result.delta.to_string(), "20 days");
        assert!(!result.is_today());
    }

    #[test]
    fn projection_on_the_day() {
        let result = project(at(2010, 3, 21), at(2024, 3, 21)).unwrap();
        assert!(result.is_today());
        assert!(result.delta.is_zero());
        assert_eq!(result.number, 14);
    }
}
