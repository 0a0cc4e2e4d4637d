//! Round-number milestones for a growing count.
//!
//! A milestone rounds a count up to the next multiple of its order of
//! magnitude: 45 → 50, 999 → 1000, 1234 → 2000.

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneResult {
    /// Strictly greater than the current count.
    pub target: u64,
    pub remaining: u64,
    /// Days at the average rate until `target` is reached.
    pub projected_cycles_needed: u64,
}

impl MilestoneResult {
    /// Next milestone strictly above `current` and how long `rate` per cycle
    /// takes to get there.
    pub fn project(current: i64, rate_per_cycle: f64) -> Result<Self> {
        let target = next_milestone_above(current)?;
        let remaining = target - current as u64;
        let projected_cycles_needed = project_cycles_needed(remaining, rate_per_cycle)?;

        Ok(Self {
            target,
            remaining,
            projected_cycles_needed,
        })
    }
}

/// `current` rounded up to a multiple of `10^(digits - 1)`.
///
/// Round numbers map to themselves: `next_milestone(1000) == 1000`.
pub fn next_milestone(current: i64) -> Result<u64> {
    let current = non_negative(current)?;
    let unit = magnitude(current);

    current
        .div_ceil(unit)
        .checked_mul(unit)
        .ok_or_else(|| Error::InvalidInput(format!("milestone for {current} overflows")))
}

/// Smallest `k * 10^p` strictly greater than `current`.
pub fn next_milestone_above(current: i64) -> Result<u64> {
    let milestone = next_milestone(current)?;
    if milestone > current as u64 {
        return Ok(milestone);
    }

    let bumped = current
        .checked_add(1)
        .ok_or_else(|| Error::InvalidInput(format!("milestone for {current} overflows")))?;
    next_milestone(bumped)
}

/// Whole cycles needed to cover `remaining` at `rate_per_cycle`, rounded up.
pub fn project_cycles_needed(remaining: u64, rate_per_cycle: f64) -> Result<u64> {
    if remaining == 0 {
        return Err(Error::InvalidInput(
            "remaining count must be positive".to_string(),
        ));
    }
    if !rate_per_cycle.is_finite() || rate_per_cycle <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "rate per cycle must be a positive number, got {rate_per_cycle}"
        )));
    }

    let cycles = (remaining as f64 / rate_per_cycle).ceil();
    if cycles >= u64::MAX as f64 {
        return Err(Error::InvalidInput(format!(
            "{remaining} at {rate_per_cycle} per cycle never completes"
        )));
    }

    Ok(cycles as u64)
}

fn non_negative(current: i64) -> Result<u64> {
    u64::try_from(current)
        .map_err(|_| Error::InvalidInput(format!("count must be non-negative, got {current}")))
}

/// `10^(digits(n) - 1)`, with 0 counted as one digit.
fn magnitude(n: u64) -> u64 {
    10u64.pow(n.checked_ilog10().unwrap_or(0))
}
