//! Time source abstraction for real and manually driven time.
//!
//! The tracker itself never reads the clock: every operation receives `now`
//! from the caller. This module provides the clocks the binary and the tests
//! use to produce those instants. A [`ManualClock`] stands in for the system
//! clock when evaluating a fixed instant (`--at`) or fast-forwarding through a
//! simulated span (`--simulate`).

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, TimeZone};
use std::cell::Cell;

use crate::constants::DATETIME_FORMAT;

/// Source of the current local date-time.
///
/// The returned value carries both the wall-clock fields (year through
/// minute) and an absolute instant that orders correctly across offset
/// changes.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The operating system clock, in the system's local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Cell<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            current: Cell::new(start),
        }
    }

    pub fn set(&self, time: DateTime<FixedOffset>) {
        self.current.set(time);
    }

    /// Move the clock by `step`. Negative steps are allowed, to model a
    /// system clock being set back.
    pub fn advance(&self, step: Duration) {
        self.current.set(self.current.get() + step);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.current.get()
    }
}

/// Parse a "YYYY-MM-DD HH:MM:SS" wall-clock time at the given UTC offset.
pub fn parse_datetime(s: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT)
        .with_context(|| format!("Invalid datetime '{}'. Use YYYY-MM-DD HH:MM:SS", s))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .with_context(|| format!("Datetime '{}' does not exist at offset {}", s, offset))
}

/// Build a fixed offset from fractional hours east of UTC.
pub fn offset_from_hours(hours: f64) -> Option<FixedOffset> {
    if !hours.is_finite() {
        return None;
    }
    FixedOffset::east_opt((hours * 3600.0).round() as i32)
}
