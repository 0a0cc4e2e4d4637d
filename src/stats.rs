use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::age::{DateDelta, compute_delta};
use crate::anniversary::{self, AnniversaryResult};
use crate::error::{Error, Result};
use crate::milestone::MilestoneResult;

/// Everything the profile page shows about an account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileStats {
    pub age: DateDelta,
    pub next_anniversary: AnniversaryResult,
    pub statuses_count: u64,
    /// Whole days since the account was created, at least 1.
    pub days_active: u64,
    pub average_rate_per_day: f64,
    /// `None` while the account has not tweeted.
    pub milestone: Option<MilestoneResult>,
    pub milestone_eta: Option<NaiveDate>,
}

impl ProfileStats {
    pub fn compute(created_at: DateTime<Utc>, statuses_count: i64, now: DateTime<Utc>) -> Result<Self> {
        let count = u64::try_from(statuses_count).map_err(|_| {
            Error::InvalidInput(format!("statuses count must be non-negative, got {statuses_count}"))
        })?;

        let age = compute_delta(now, created_at);
        let next_anniversary = anniversary::project(created_at, now)?;

        // An account created today has been active for one day.
        let days_active = (now - created_at).num_days().max(1) as u64;
        let average_rate_per_day = count as f64 / days_active as f64;

        let milestone = if count > 0 {
            Some(MilestoneResult::project(statuses_count, average_rate_per_day)?)
        } else {
            None
        };
        let milestone_eta = milestone.and_then(|m| {
            now.date_naive()
                .checked_add_days(Days::new(m.projected_cycles_needed))
        });

        Ok(Self {
            age,
            next_anniversary,
            statuses_count: count,
            days_active,
            average_rate_per_day,
            milestone,
            milestone_eta,
        })
    }
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
    fn computes_profile_stats() {
        let now = at(2024, 6, 15);
        let stats = ProfileStats::compute(at(2020, 1, 10), 1_234, now).unwrap();

        assert_eq!(stats.age.to_string(), "4 years, 5 months and 5 days");
        assert_eq!(stats.age.sign, Sign::Later);
        assert_eq!(stats.next_anniversary.next_occurrence, at(2025, 1, 10));
        assert_eq!(stats.next_anniversary.number, 5);
        assert_eq!(stats.days_active, 1_618);
        assert!((stats.average_rate_per_day - 1_234.0 / 1_618.0).abs() < 1e-9);

        let milestone = stats.milestone.unwrap();
        assert_eq!(milestone.target, 2_000);
        assert_eq!(milestone.remaining, 766);
        assert_eq!(milestone.projected_cycles_needed, 1_005);
        assert_eq!(
            stats.milestone_eta,
            now.date_naive().checked_add_days(Days::new(1_005))
        );
    }

    #[test]
    fn silent_account_has_no_milestone() {
        let stats = ProfileStats::compute(at(2020, 1, 10), 0, at(2024, 6, 15)).unwrap();
        assert_eq!(stats.average_rate_per_day, 0.0);
        assert!(stats.milestone.is_none());
        assert!(stats.milestone_eta.is_none());
    }

    #[test]
    fn brand_new_account_counts_one_day() {
        let created = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
        let stats = ProfileStats::compute(created, 3, now).unwrap();

        assert_eq!(stats.days_active, 1);
        assert!(stats.age.is_zero());
        assert!(stats.next_anniversary.is_today());
        assert_eq!(stats.milestone.unwrap().target, 4);
    }

    #[test]
    fn negative_count_is_rejected() {
        let err = ProfileStats::compute(at(2020, 1, 10), -5, at(2024, 6, 15)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
