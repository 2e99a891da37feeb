//! Recomputation policy and polling cadence.
//!
//! The tracker is driven by ticks from a caller-owned loop. This module holds
//! the two decisions around that loop:
//! - **Refresh planning**: on each tick, whether the cached day window is still
//!   valid, can be rolled forward by one day, or has to be rebuilt.
//! - **Next check**: how long a polling caller may sleep before the next tick
//!   without missing a boundary or a calendar-day change.
//!
//! Both decisions are made from absolute calendar dates and timestamps only.
//! Nothing here accumulates elapsed time, so clock jumps in either direction
//! are handled by the same comparisons as normal operation.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::time::Duration as StdDuration;

/// What a tick must do with the cached day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Cache is valid for today, or today already failed to compute
    Keep,
    /// Today is the day after the cached date: shift the window by one day
    Advance,
    /// No cache, or the date moved by anything other than one day forward
    Rebuild,
}

/// Decide how to bring the day window up to date for `today`.
///
/// # Arguments
/// * `cached` - Date of the cached current day record, if any
/// * `failed` - Date of the last failed recomputation, if any
/// * `today` - Calendar date of the instant being evaluated
pub fn plan_refresh(
    cached: Option<NaiveDate>,
    failed: Option<NaiveDate>,
    today: NaiveDate,
) -> Refresh {
    match cached {
        Some(date) if date == today => Refresh::Keep,
        // Retry only on the next date change or a forced refresh
        _ if failed == Some(today) => Refresh::Keep,
        Some(date) if date.succ_opt() == Some(today) => Refresh::Advance,
        _ => Refresh::Rebuild,
    }
}

/// Time from `now` until the next local midnight in `now`'s offset.
pub fn until_next_midnight(now: DateTime<FixedOffset>) -> Option<StdDuration> {
    let tomorrow = now.date_naive().succ_opt()?;
    let midnight = now
        .offset()
        .from_local_datetime(&tomorrow.and_hms_opt(0, 0, 0)?)
        .single()?;
    (midnight - now).to_std().ok()
}

/// How long a polling loop can sleep before it must tick again.
///
/// The result is the shortest of the configured interval, the time to the
/// next boundary and the time to the next local midnight, and never less than
/// one second so a loop sitting exactly on a boundary cannot spin.
///
/// # Arguments
/// * `now` - Current instant, expressed in the tracker's offset
/// * `time_to_change` - Time until the next sunrise/sunset boundary, if known
/// * `interval` - Configured upper bound between ticks
pub fn next_check_in(
    now: DateTime<FixedOffset>,
    time_to_change: Option<StdDuration>,
    interval: StdDuration,
) -> StdDuration {
    let one_second = StdDuration::from_secs(1);

    // Wake just past the boundary: a tick exactly on it still reports the old state
    let candidates = [
        Some(interval),
        time_to_change.map(|d| d + one_second),
        until_next_midnight(now).map(|d| d + one_second),
    ];

    candidates
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(interval)
        .max(one_second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{offset_from_hours, parse_datetime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plan_refresh_same_day_keeps_cache() {
        let today = date(2024, 6, 21);
        assert_eq!(plan_refresh(Some(today), None, today), Refresh::Keep);
    }

    #[test]
    fn test_plan_refresh_next_day_advances() {
        assert_eq!(
            plan_refresh(Some(date(2024, 12, 31)), None, date(2025, 1, 1)),
            Refresh::Advance
        );
    }

    #[test]
    fn test_plan_refresh_rebuilds_on_jumps() {
        // First tick
        assert_eq!(plan_refresh(None, None, date(2024, 6, 21)), Refresh::Rebuild);
        // Clock set back a day
        assert_eq!(
            plan_refresh(Some(date(2024, 6, 21)), None, date(2024, 6, 20)),
            Refresh::Rebuild
        );
        // Resume after a multi-day suspend
        assert_eq!(
            plan_refresh(Some(date(2024, 6, 21)), None, date(2024, 6, 24)),
            Refresh::Rebuild
        );
    }

    #[test]
    fn test_plan_refresh_does_not_retry_failed_date() {
        let today = date(2024, 6, 21);
        let yesterday = date(2024, 6, 20);

        assert_eq!(plan_refresh(Some(yesterday), Some(today), today), Refresh::Keep);
        assert_eq!(plan_refresh(None, Some(today), today), Refresh::Keep);
        // A new date clears the memo
        assert_eq!(
            plan_refresh(Some(yesterday), Some(yesterday), today),
            Refresh::Advance
        );
    }

    #[test]
    fn test_until_next_midnight() {
        let offset = offset_from_hours(1.0).unwrap();
        let now = parse_datetime("2024-06-21 23:30:00", offset).unwrap();
        assert_eq!(until_next_midnight(now), Some(StdDuration::from_secs(30 * 60)));
    }

    #[test]
    fn test_next_check_in_picks_shortest() {
        let offset = offset_from_hours(0.0).unwrap();
        let now = parse_datetime("2024-06-21 12:00:00", offset).unwrap();
        let interval = StdDuration::from_secs(60);

        // Interval wins when the boundary is far away
        assert_eq!(
            next_check_in(now, Some(StdDuration::from_secs(3600)), interval),
            interval
        );

        // Boundary wins when it is close
        assert_eq!(
            next_check_in(now, Some(StdDuration::from_secs(10)), interval),
            StdDuration::from_secs(11)
        );

        // Midnight wins near the end of the day
        let late = parse_datetime("2024-06-21 23:59:50", offset).unwrap();
        assert_eq!(next_check_in(late, None, interval), StdDuration::from_secs(11));
    }

    #[test]
    fn test_next_check_in_never_zero() {
        let offset = offset_from_hours(0.0).unwrap();
        let now = parse_datetime("2024-06-21 12:00:00", offset).unwrap();
        let check = next_check_in(now, Some(StdDuration::ZERO), StdDuration::ZERO);
        assert_eq!(check, StdDuration::from_secs(1));
    }
}
