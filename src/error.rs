//! Error types surfaced by the sun state tracker.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while configuring or updating a [`crate::SunTracker`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// Coordinates outside [-90, 90] latitude or [-180, 180] longitude
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    /// Timezone offset (including any daylight-saving adjustment) outside ±14 hours
    #[error("invalid timezone offset: {hours} hours")]
    InvalidTimezone { hours: f64 },

    /// Sunrise or sunset offset that is not finite or exceeds ±720 minutes
    #[error("invalid boundary offset: {minutes} minutes")]
    InvalidOffset { minutes: f64 },

    /// The position provider produced no usable boundary for this date
    #[error("cannot compute sunrise/sunset for {date}: {reason}")]
    ComputationFailure { date: NaiveDate, reason: String },
}

impl TrackerError {
    pub(crate) fn computation(date: NaiveDate, reason: impl Into<String>) -> Self {
        TrackerError::ComputationFailure {
            date,
            reason: reason.into(),
        }
    }
}
