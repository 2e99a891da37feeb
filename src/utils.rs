//! Utility functions shared across the codebase.
//!
//! This module provides formatting helpers for clock times, durations and
//! progress values used by logging and the status output.

use chrono::{DateTime, TimeZone};
use std::time::Duration as StdDuration;

use crate::constants::PROGRESS_BAR_WIDTH;

/// Format a date-time as a 24-hour "HH:MM" wall-clock time.
pub fn format_clock_time<Tz: TimeZone>(time: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M").to_string()
}

/// Format a duration in a compact human-readable form.
///
/// Hours are omitted when zero, seconds are omitted once the duration
/// reaches an hour.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use sunwatch::utils::format_duration;
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
/// assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 60 * 7 + 9)), "3h 7m");
/// ```
pub fn format_duration(duration: StdDuration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Render a progress fraction as a fixed-width text bar with a percentage.
///
/// Progress is clamped to [0.0, 1.0].
pub fn progress_bar(progress: f64) -> String {
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    let filled = (progress * PROGRESS_BAR_WIDTH as f64).round() as usize;

    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        progress * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{offset_from_hours, parse_datetime};

    #[test]
    fn test_format_clock_time() {
        let offset = offset_from_hours(2.0).unwrap();
        let time = parse_datetime("2024-06-21 05:18:59", offset).unwrap();
        assert_eq!(format_clock_time(time), "05:18");
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(StdDuration::ZERO), "0s");
        assert_eq!(format_duration(StdDuration::from_secs(59)), "59s");
        assert_eq!(format_duration(StdDuration::from_secs(60)), "1m 0s");
        assert_eq!(format_duration(StdDuration::from_secs(3600)), "1h 0m");
        assert_eq!(format_duration(StdDuration::from_secs(12 * 3600 + 59)), "12h 0m");
    }

    #[test]
    fn test_progress_bar_bounds() {
        let empty = progress_bar(0.0);
        assert!(empty.starts_with(&format!("[{}]", "-".repeat(PROGRESS_BAR_WIDTH))));
        assert!(empty.ends_with("  0%"));

        let full = progress_bar(1.0);
        assert!(full.starts_with(&format!("[{}]", "#".repeat(PROGRESS_BAR_WIDTH))));
        assert!(full.ends_with("100%"));

        // Clamped
        assert_eq!(progress_bar(-1.0), empty);
        assert_eq!(progress_bar(2.0), full);
        assert_eq!(progress_bar(f64::NAN), empty);
    }

    #[test]
    fn test_progress_bar_half() {
        let half = progress_bar(0.5);
        let filled = half.chars().filter(|c| *c == '#').count();
        assert_eq!(filled, PROGRESS_BAR_WIDTH / 2);
        assert!(half.ends_with(" 50%"));
    }
}
