//! Application constants and default values for sunwatch.
//!
//! This module contains the configuration defaults, validation limits,
//! and operational constants used throughout the crate.

// ═══ Configuration Defaults ═══
// Used when an option is missing from sunwatch.toml

pub const DEFAULT_LATITUDE: f64 = 52.37; // Amsterdam
pub const DEFAULT_LONGITUDE: f64 = 4.90;
pub const DEFAULT_TIMEZONE_OFFSET: f64 = 1.0; // hours east of UTC
pub const DEFAULT_DAYLIGHT_SAVING: bool = false;
pub const DEFAULT_SUNRISE_OFFSET: i32 = 0; // minutes
pub const DEFAULT_SUNSET_OFFSET: i32 = 0; // minutes
pub const DEFAULT_TWILIGHT: &str = "official";
pub const DEFAULT_UPDATE_INTERVAL: u64 = 60; // seconds between ticks in the polling loop

// ═══ Validation Limits ═══

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// Real-world UTC offsets range from -12:00 to +14:00
pub const MAXIMUM_TIMEZONE_OFFSET_HOURS: f64 = 14.0;
pub const DAYLIGHT_SAVING_HOURS: f64 = 1.0;

// A boundary may not be pushed more than half a day away from the raw event
pub const MAXIMUM_BOUNDARY_OFFSET_MINUTES: i32 = 720;

pub const MINIMUM_UPDATE_INTERVAL: u64 = 1; // seconds
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 3600; // seconds

// ═══ Solar Computation ═══

pub const MINUTES_PER_DAY: f64 = 1440.0;

// Day lengths outside (MIN, MAX) are treated as polar day or polar night
pub const MINIMUM_DAY_LENGTH_MINUTES: f64 = 1.0;
pub const MAXIMUM_DAY_LENGTH_MINUTES: f64 = MINUTES_PER_DAY - 1.0;

// An event further than this from the requested date is a failed computation
pub const MAXIMUM_EVENT_DRIFT_MINUTES: f64 = 2.0 * MINUTES_PER_DAY;

// ═══ Operational Timing Constants ═══

// How often the loop re-checks the running flag while sleeping
pub const CHECK_INTERVAL_SECS: u64 = 1;

// ═══ User Interface Constants ═══

pub const PROGRESS_BAR_WIDTH: usize = 30;
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
