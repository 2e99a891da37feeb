//! # Sunwatch
//!
//! Tracks whether the sun is up at a fixed location and notifies subscribers
//! when it rises or sets.
//!
//! A [`SunTracker`] is driven by ticks carrying the current local time. It
//! recomputes sunrise and sunset once per calendar date through a
//! [`PositionProvider`], applies configurable boundary offsets, and answers
//! how far the current day or night phase has progressed and how long until
//! the next change.
//!
//! ## Architecture
//!
//! - **sun_state**: The tracker, its day records and the sun state
//! - **notifier**: Ordered fan-out of state changes to subscribers
//! - **schedule**: When to recompute, and how long a polling loop may sleep
//! - **geo**: Position provider trait and the default solar calculator
//! - **clock**: System and manual time sources
//! - **config**: Configuration loading, validation, and default generation
//! - **args**: Command-line parsing for the binary
//! - **error**: Tracker error type
//! - **logger**: Structured logging with visual formatting
//! - **constants**: Application-wide constants and defaults
//! - **utils**: Formatting helpers for times, durations and progress

pub mod args;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod logger;
pub mod notifier;
pub mod schedule;
pub mod sun_state;
pub mod utils;

// Re-export important types for easier access
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::TrackerError;
pub use geo::{PositionProvider, SolarCalculator, Twilight};
pub use logger::{Log, LogLevel};
pub use notifier::{EventNotifier, SubscriptionId};
pub use sun_state::{DayRecord, DayWindow, Location, Offsets, Phase, SunState, SunTracker};
