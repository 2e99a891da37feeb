//! Sunrise and sunset calculation for a fixed position and calendar date.
//!
//! The tracker never talks to the astronomy code directly. It drives a
//! [`PositionProvider`]: set a position, set a date, then ask for the sunrise
//! and sunset as minutes elapsed since local midnight. [`SolarCalculator`] is
//! the default provider, backed by the `sunrise` crate, and supports the
//! official horizon as well as the three twilight horizons.
//!
//! Providers report a missing boundary with `None`. This happens at polar
//! latitudes during midnight sun or polar night, where the sun never crosses
//! the requested horizon on that date.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

use crate::constants::{
    MAXIMUM_DAY_LENGTH_MINUTES, MAXIMUM_EVENT_DRIFT_MINUTES, MINIMUM_DAY_LENGTH_MINUTES,
};

/// Source of raw sunrise/sunset minutes for one position and date.
///
/// Implementations must be deterministic: identical position and date yield
/// identical results. The only state they keep is the last position and date
/// that were set.
pub trait PositionProvider {
    /// Set the observer position and the timezone offset (hours east of UTC,
    /// daylight saving already included) used to express results.
    fn set_position(&mut self, latitude: f64, longitude: f64, timezone_offset_hours: f64);

    /// Set the local calendar date to compute for.
    fn set_date(&mut self, year: i32, month: u32, day: u32);

    /// Minutes from local midnight to sunrise, or `None` if there is none.
    fn calc_sunrise(&self) -> Option<f64>;

    /// Minutes from local midnight to sunset, or `None` if there is none.
    fn calc_sunset(&self) -> Option<f64>;
}

/// Horizon used to decide when the sun counts as risen or set.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Twilight {
    /// Upper limb on the horizon, corrected for refraction (-0.833°)
    #[default]
    Official,
    /// Sun 6° below the horizon
    Civil,
    /// Sun 12° below the horizon
    Nautical,
    /// Sun 18° below the horizon
    Astronomical,
}

impl Twilight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Twilight::Official => "official",
            Twilight::Civil => "civil",
            Twilight::Nautical => "nautical",
            Twilight::Astronomical => "astronomical",
        }
    }

    fn rise_event(self) -> SolarEvent {
        match self {
            Twilight::Official => SolarEvent::Sunrise,
            Twilight::Civil => SolarEvent::Dawn(DawnType::Civil),
            Twilight::Nautical => SolarEvent::Dawn(DawnType::Nautical),
            Twilight::Astronomical => SolarEvent::Dawn(DawnType::Astronomical),
        }
    }

    fn set_event(self) -> SolarEvent {
        match self {
            Twilight::Official => SolarEvent::Sunset,
            Twilight::Civil => SolarEvent::Dusk(DawnType::Civil),
            Twilight::Nautical => SolarEvent::Dusk(DawnType::Nautical),
            Twilight::Astronomical => SolarEvent::Dusk(DawnType::Astronomical),
        }
    }
}

impl fmt::Display for Twilight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Twilight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "official" => Ok(Twilight::Official),
            "civil" => Ok(Twilight::Civil),
            "nautical" => Ok(Twilight::Nautical),
            "astronomical" => Ok(Twilight::Astronomical),
            other => Err(format!(
                "Unknown twilight '{}'. Expected official, civil, nautical or astronomical",
                other
            )),
        }
    }
}

/// Default [`PositionProvider`] using the `sunrise` crate.
#[derive(Debug, Clone, Default)]
pub struct SolarCalculator {
    latitude: f64,
    longitude: f64,
    timezone_offset_hours: f64,
    date: Option<NaiveDate>,
    twilight: Twilight,
}

impl SolarCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a twilight horizon instead of the official sunrise/sunset.
    pub fn with_twilight(mut self, twilight: Twilight) -> Self {
        self.twilight = twilight;
        self
    }

    pub fn twilight(&self) -> Twilight {
        self.twilight
    }

    /// Local midnight of the configured date, as a UTC instant.
    fn local_midnight_utc(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let offset_secs = (self.timezone_offset_hours * 3600.0).round() as i64;
        let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
        Some(midnight - Duration::seconds(offset_secs))
    }

    /// Minutes from local midnight to `event`, rejecting results that are not
    /// anchored to the requested date (the crate degrades to the Unix epoch
    /// when the sun never reaches the horizon).
    fn event_minutes(&self, event: SolarEvent) -> Option<f64> {
        let date = self.date?;
        let coord = Coordinates::new(self.latitude, self.longitude)?;
        let event_utc = SolarDay::new(coord, date).event_time(event);
        let midnight = self.local_midnight_utc(date)?;

        let minutes = (event_utc - midnight).num_seconds() as f64 / 60.0;
        if !minutes.is_finite() || minutes.abs() > MAXIMUM_EVENT_DRIFT_MINUTES {
            return None;
        }
        Some(minutes)
    }

    /// Sunrise and sunset minutes, or `None` during polar day or polar night.
    fn boundaries(&self) -> Option<(f64, f64)> {
        let sunrise = self.event_minutes(self.twilight.rise_event())?;
        let sunset = self.event_minutes(self.twilight.set_event())?;

        let day_length = sunset - sunrise;
        if !(MINIMUM_DAY_LENGTH_MINUTES..=MAXIMUM_DAY_LENGTH_MINUTES).contains(&day_length) {
            return None;
        }
        Some((sunrise, sunset))
    }
}

impl PositionProvider for SolarCalculator {
    fn set_position(&mut self, latitude: f64, longitude: f64, timezone_offset_hours: f64) {
        self.latitude = latitude;
        self.longitude = longitude;
        self.timezone_offset_hours = timezone_offset_hours;
    }

    fn set_date(&mut self, year: i32, month: u32, day: u32) {
        self.date = NaiveDate::from_ymd_opt(year, month, day);
    }

    fn calc_sunrise(&self) -> Option<f64> {
        self.boundaries().map(|(sunrise, _)| sunrise)
    }

    fn calc_sunset(&self) -> Option<f64> {
        self.boundaries().map(|(_, sunset)| sunset)
    }
}
