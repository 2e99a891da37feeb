//! Sun state tracking: day/night state, boundaries, progress and countdown.
//!
//! [`SunTracker`] owns a location, a pair of boundary offsets and a
//! [`PositionProvider`]. Each call to [`SunTracker::tick`] brings its cached
//! day window up to date for the calendar date of `now`, derives whether the
//! sun is up, and notifies subscribers when that state changes.
//!
//! ## Day window
//! Boundaries are cached as absolute timestamps for three consecutive dates:
//! yesterday, today and tomorrow. Today's record decides the state. The
//! adjacent records supply the night phases that cross midnight, so progress
//! and time-to-next-change stay continuous from one day to the next. Rolling
//! forward one day reuses two records and computes one; any other date change
//! rebuilds all three.
//!
//! ## Boundary offsets
//! An offset is the number of minutes *ahead* of the raw event at which the
//! boundary is placed. A sunrise offset of 30 moves the Down→Up transition 30
//! minutes earlier; -30 delays it by 30 minutes.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone};
use std::fmt;
use std::time::Duration as StdDuration;

use crate::clock::offset_from_hours;
use crate::constants::{
    MAXIMUM_BOUNDARY_OFFSET_MINUTES, MAXIMUM_EVENT_DRIFT_MINUTES, MAXIMUM_LATITUDE,
    MAXIMUM_LONGITUDE, MAXIMUM_TIMEZONE_OFFSET_HOURS, MINIMUM_LATITUDE, MINIMUM_LONGITUDE,
};
use crate::error::TrackerError;
use crate::geo::solar::{PositionProvider, SolarCalculator};
use crate::logger::Log;
use crate::notifier::{EventNotifier, SubscriptionId};
use crate::schedule::{Refresh, plan_refresh};
use crate::utils::format_clock_time;

/// Whether the sun is above or below the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SunState {
    /// No boundary has been computed yet
    #[default]
    Unknown,
    Up,
    Down,
}

impl SunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunState::Unknown => "Unknown",
            SunState::Up => "Up",
            SunState::Down => "Down",
        }
    }
}

impl fmt::Display for SunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer position and the UTC offset local times are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Degrees, -90 (south) to 90 (north)
    pub latitude: f64,
    /// Degrees, -180 (west) to 180 (east)
    pub longitude: f64,
    /// Hours east of UTC, with any daylight-saving adjustment already added
    pub timezone_offset_hours: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, timezone_offset_hours: f64) -> Self {
        Self {
            latitude,
            longitude,
            timezone_offset_hours,
        }
    }

    /// Check coordinate ranges and build the fixed UTC offset.
    fn validate(&self) -> Result<FixedOffset, TrackerError> {
        let latitude_ok = (MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&self.latitude);
        let longitude_ok = (MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&self.longitude);
        if !latitude_ok || !longitude_ok {
            return Err(TrackerError::InvalidLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }

        let hours = self.timezone_offset_hours;
        if hours.abs() > MAXIMUM_TIMEZONE_OFFSET_HOURS {
            return Err(TrackerError::InvalidTimezone { hours });
        }
        offset_from_hours(hours).ok_or(TrackerError::InvalidTimezone { hours })
    }
}

/// Minutes ahead of the raw sunrise/sunset at which each boundary is placed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offsets {
    pub sunrise_minutes: f64,
    pub sunset_minutes: f64,
}

impl Offsets {
    pub fn new(sunrise_minutes: f64, sunset_minutes: f64) -> Self {
        Self {
            sunrise_minutes,
            sunset_minutes,
        }
    }

    fn validate(&self) -> Result<(), TrackerError> {
        let limit = MAXIMUM_BOUNDARY_OFFSET_MINUTES as f64;
        for minutes in [self.sunrise_minutes, self.sunset_minutes] {
            if !minutes.is_finite() || minutes.abs() > limit {
                return Err(TrackerError::InvalidOffset { minutes });
            }
        }
        Ok(())
    }
}

/// Offset-adjusted sunrise and sunset of one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRecord {
    date: NaiveDate,
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
}

impl DayRecord {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sunrise(&self) -> DateTime<FixedOffset> {
        self.sunrise
    }

    pub fn sunset(&self) -> DateTime<FixedOffset> {
        self.sunset
    }

    /// Daylight is the open interval between the boundaries.
    pub fn is_up_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.sunrise < now && now < self.sunset
    }

    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }
}

/// Interval during which the sun state is constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub state: SunState,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl Phase {
    /// Fraction of the phase elapsed at `now`, clamped to [0, 1].
    pub fn progress(&self, now: DateTime<FixedOffset>) -> f64 {
        let total = (self.end - self.start).num_milliseconds() as f64;
        if total <= 0.0 {
            return 1.0;
        }
        let elapsed = (now - self.start).num_milliseconds() as f64;
        (elapsed / total).clamp(0.0, 1.0)
    }

    pub fn remaining(&self, now: DateTime<FixedOffset>) -> StdDuration {
        (self.end - now).to_std().unwrap_or(StdDuration::ZERO)
    }

    pub fn length(&self) -> StdDuration {
        (self.end - self.start).to_std().unwrap_or(StdDuration::ZERO)
    }
}

/// Records for the day before, the current day and the day after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    previous: Option<DayRecord>,
    current: DayRecord,
    next: Option<DayRecord>,
}

impl DayWindow {
    /// Assemble a window, dropping adjacent records that would overlap the
    /// current day (possible with large offsets).
    fn new(previous: Option<DayRecord>, current: DayRecord, next: Option<DayRecord>) -> Self {
        let previous = previous.filter(|p| p.sunset < current.sunrise);
        let next = next.filter(|n| current.sunset < n.sunrise);
        Self {
            previous,
            current,
            next,
        }
    }

    pub fn previous(&self) -> Option<&DayRecord> {
        self.previous.as_ref()
    }

    pub fn current(&self) -> &DayRecord {
        &self.current
    }

    pub fn next(&self) -> Option<&DayRecord> {
        self.next.as_ref()
    }

    /// Find the phase containing `now`.
    ///
    /// Up phases are open intervals, Down phases are closed, matching the
    /// state rule: exactly on a boundary the sun counts as down.
    pub fn phase_at(&self, now: DateTime<FixedOffset>) -> Option<Phase> {
        let edges: Vec<(DateTime<FixedOffset>, SunState)> =
            [self.previous.as_ref(), Some(&self.current), self.next.as_ref()]
                .into_iter()
                .flatten()
                .flat_map(|r| [(r.sunrise, SunState::Up), (r.sunset, SunState::Down)])
                .collect();

        edges.windows(2).find_map(|pair| {
            let (start, state) = pair[0];
            let end = pair[1].0;
            let inside = match state {
                SunState::Up => start < now && now < end,
                _ => start <= now && now <= end,
            };
            inside.then_some(Phase { state, start, end })
        })
    }
}

/// Tracks whether the sun is up for one location and notifies on changes.
///
/// The tracker is single-owner and performs no locking. All work happens
/// synchronously inside the calls made on it.
pub struct SunTracker<P: PositionProvider = SolarCalculator> {
    location: Location,
    offsets: Offsets,
    offset: FixedOffset,
    provider: P,
    window: Option<DayWindow>,
    state: SunState,
    last_evaluated: Option<DateTime<FixedOffset>>,
    failed_date: Option<NaiveDate>,
    last_error: Option<TrackerError>,
    recomputations: u64,
    notifier: EventNotifier,
}

impl<P: PositionProvider> SunTracker<P> {
    /// Validate the configuration and compute the state at `now`.
    ///
    /// Invalid coordinates, timezone or offsets fail initialization. A failed
    /// solar computation does not: the tracker starts in `SunState::Unknown`,
    /// records the error in [`SunTracker::last_error`] and retries on the next
    /// date change or `refresh`.
    pub fn init<Tz: TimeZone>(
        location: Location,
        offsets: Offsets,
        mut provider: P,
        now: &DateTime<Tz>,
    ) -> Result<Self, TrackerError> {
        let offset = location.validate()?;
        offsets.validate()?;

        provider.set_position(
            location.latitude,
            location.longitude,
            location.timezone_offset_hours,
        );

        let mut tracker = Self {
            location,
            offsets,
            offset,
            provider,
            window: None,
            state: SunState::Unknown,
            last_evaluated: None,
            failed_date: None,
            last_error: None,
            recomputations: 0,
            notifier: EventNotifier::new(),
        };

        // The failure stays available through `last_error`
        if let Err(e) = tracker.refresh(now) {
            Log::log_debug(&format!("Starting without a day window: {}", e));
        }
        Ok(tracker)
    }

    /// Bring the tracker up to date for `now`.
    ///
    /// Recomputes only when the calendar date of `now` differs from the cached
    /// one, then re-derives the state. Returns the new state if it changed.
    pub fn tick<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
    ) -> Result<Option<SunState>, TrackerError> {
        let now = now.with_timezone(&self.offset);
        let today = now.date_naive();
        let cached = self.window.as_ref().map(|w| w.current.date);

        match plan_refresh(cached, self.failed_date, today) {
            Refresh::Keep => {}
            Refresh::Advance => self.advance_window(today)?,
            Refresh::Rebuild => self.rebuild_window(today)?,
        }

        Ok(self.evaluate(now))
    }

    /// Recompute the day window for `now` regardless of the cache.
    pub fn refresh<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
    ) -> Result<Option<SunState>, TrackerError> {
        let now = now.with_timezone(&self.offset);
        self.failed_date = None;
        self.rebuild_window(now.date_naive())?;
        Ok(self.evaluate(now))
    }

    /// Fraction of the current phase (day or night) elapsed at `now`.
    ///
    /// Night phases run from one day's sunset to the next day's sunrise, so
    /// the value keeps growing across midnight. `None` before the first
    /// successful computation or when `now` falls outside the cached window.
    pub fn progress<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<f64> {
        let now = now.with_timezone(&self.offset);
        self.phase_at(now).map(|phase| phase.progress(now))
    }

    /// Time until the next boundary crossing.
    pub fn time_to_next_change<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<StdDuration> {
        let now = now.with_timezone(&self.offset);
        self.phase_at(now).map(|phase| phase.remaining(now))
    }

    /// Minutes until the next boundary crossing.
    pub fn minutes_to_next_change<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<f64> {
        self.time_to_next_change(now)
            .map(|remaining| remaining.as_secs_f64() / 60.0)
    }

    /// The phase containing `now`, if the cached window covers it.
    pub fn phase<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Phase> {
        self.phase_at(now.with_timezone(&self.offset))
    }

    fn phase_at(&self, now: DateTime<FixedOffset>) -> Option<Phase> {
        self.window.as_ref()?.phase_at(now)
    }

    // ═══ Subscriptions ═══

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(SunState) + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn on_up<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        self.notifier.on_up(callback)
    }

    pub fn on_down<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut() + 'static,
    {
        self.notifier.on_down(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ═══ Accessors ═══

    pub fn sun_state(&self) -> SunState {
        self.state
    }

    pub fn is_sun_up(&self) -> bool {
        self.state == SunState::Up
    }

    /// Today's record, if one has been computed.
    pub fn day_record(&self) -> Option<&DayRecord> {
        self.window.as_ref().map(|w| &w.current)
    }

    pub fn window(&self) -> Option<&DayWindow> {
        self.window.as_ref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    /// The fixed UTC offset all boundaries are expressed in.
    pub fn utc_offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn last_evaluated(&self) -> Option<DateTime<FixedOffset>> {
        self.last_evaluated
    }

    /// The most recent failure to compute the current day, cleared once a
    /// window is installed again.
    pub fn last_error(&self) -> Option<&TrackerError> {
        self.last_error.as_ref()
    }

    /// Number of day windows installed so far (rebuilds and advances).
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    // ═══ Internals ═══

    /// Derive the state at `now` and notify on change.
    fn evaluate(&mut self, now: DateTime<FixedOffset>) -> Option<SunState> {
        self.last_evaluated = Some(now);

        let current = &self.window.as_ref()?.current;
        // A failed recomputation leaves a stale window; keep the last state
        if current.date != now.date_naive() {
            return None;
        }

        let state = if current.is_up_at(now) {
            SunState::Up
        } else {
            SunState::Down
        };
        if state == self.state {
            return None;
        }

        Log::log_debug(&format!(
            "Sun state changed from {} to {} at {}",
            self.state,
            state,
            format_clock_time(now)
        ));
        self.state = state;
        self.notifier.notify(state);
        Some(state)
    }

    fn rebuild_window(&mut self, today: NaiveDate) -> Result<(), TrackerError> {
        let current = self.compute_current(today)?;
        let previous = today.pred_opt().and_then(|d| self.compute_adjacent(d));
        let next = today.succ_opt().and_then(|d| self.compute_adjacent(d));

        self.install(DayWindow::new(previous, current, next));
        Ok(())
    }

    fn advance_window(&mut self, today: NaiveDate) -> Result<(), TrackerError> {
        let Some(old) = self.window.clone() else {
            return self.rebuild_window(today);
        };

        let current = match old.next {
            Some(record) if record.date == today => record,
            _ => self.compute_current(today)?,
        };
        let next = today.succ_opt().and_then(|d| self.compute_adjacent(d));

        self.install(DayWindow::new(Some(old.current), current, next));
        Ok(())
    }

    fn install(&mut self, window: DayWindow) {
        let current = window.current;
        Log::log_debug(&format!(
            "Boundaries for {}: sunrise {}, sunset {}",
            current.date,
            format_clock_time(current.sunrise),
            format_clock_time(current.sunset)
        ));

        self.window = Some(window);
        self.failed_date = None;
        self.last_error = None;
        self.recomputations += 1;
    }

    /// Compute today's record, remembering the date if it fails.
    fn compute_current(&mut self, date: NaiveDate) -> Result<DayRecord, TrackerError> {
        self.compute_record(date).inspect_err(|e| {
            Log::log_warning(&format!("{}. Keeping sun state {}", e, self.state));
            self.failed_date = Some(date);
            self.last_error = Some(e.clone());
        })
    }

    /// Compute an adjacent day's record.
    ///
    /// Failures only disable the night queries that cross midnight.
    fn compute_adjacent(&mut self, date: NaiveDate) -> Option<DayRecord> {
        match self.compute_record(date) {
            Ok(record) => Some(record),
            Err(e) => {
                Log::log_debug(&format!("Adjacent day unavailable: {}", e));
                None
            }
        }
    }

    fn compute_record(&mut self, date: NaiveDate) -> Result<DayRecord, TrackerError> {
        self.provider.set_date(date.year(), date.month(), date.day());

        let raw_sunrise = self
            .provider
            .calc_sunrise()
            .ok_or_else(|| TrackerError::computation(date, "the sun does not rise"))?;
        let raw_sunset = self
            .provider
            .calc_sunset()
            .ok_or_else(|| TrackerError::computation(date, "the sun does not set"))?;

        for raw in [raw_sunrise, raw_sunset] {
            if !raw.is_finite() || raw.abs() > MAXIMUM_EVENT_DRIFT_MINUTES {
                return Err(TrackerError::computation(
                    date,
                    format!("event at {} minutes after midnight is out of range", raw),
                ));
            }
        }

        let midnight = date
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| self.offset.from_local_datetime(&naive).single())
            .ok_or_else(|| {
                TrackerError::computation(date, "local midnight is not representable")
            })?;

        let boundary = |raw: f64, offset: f64| {
            minutes(raw - offset)
                .and_then(|delta| midnight.checked_add_signed(delta))
                .ok_or_else(|| TrackerError::computation(date, "boundary is out of range"))
        };
        let sunrise = boundary(raw_sunrise, self.offsets.sunrise_minutes)?;
        let sunset = boundary(raw_sunset, self.offsets.sunset_minutes)?;

        if sunrise >= sunset {
            return Err(TrackerError::computation(
                date,
                format!(
                    "sunrise {} is not before sunset {}",
                    format_clock_time(sunrise),
                    format_clock_time(sunset)
                ),
            ));
        }

        Ok(DayRecord {
            date,
            sunrise,
            sunset,
        })
    }
}

impl<P: PositionProvider> fmt::Debug for SunTracker<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SunTracker")
            .field("location", &self.location)
            .field("offsets", &self.offsets)
            .field("state", &self.state)
            .field("window", &self.window)
            .field("failed_date", &self.failed_date)
            .field("last_error", &self.last_error)
            .field("notifier", &self.notifier)
            .finish()
    }
}

fn minutes(value: f64) -> Option<Duration> {
    Duration::try_milliseconds((value * 60_000.0).round() as i64)
}
