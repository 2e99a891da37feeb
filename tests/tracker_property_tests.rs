use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};
use proptest::prelude::*;

use sunwatch::clock::offset_from_hours;
use sunwatch::{Location, Offsets, PositionProvider, SolarCalculator, SunState, SunTracker};

/// Latitudes where the sun rises and sets every day of the year
fn latitude_strategy() -> impl Strategy<Value = f64> {
    -50.0..50.0
}

fn longitude_strategy() -> impl Strategy<Value = f64> {
    -170.0..170.0
}

/// A local instant somewhere in 2024, as (day of year, minute of day)
fn instant_strategy() -> impl Strategy<Value = (u32, i64)> {
    (1u32..=366, 0i64..1440)
}

/// Boundary offsets small enough to never push sunrise past sunset
fn offsets_strategy() -> impl Strategy<Value = Offsets> {
    (-90.0..90.0, -90.0..90.0).prop_map(|(rise, set)| Offsets::new(rise, set))
}

/// Nominal zone offset for a longitude, to keep solar noon near 12:00
fn timezone_for(longitude: f64) -> f64 {
    (longitude / 15.0).round()
}

fn local_instant(timezone: f64, day_of_year: u32, minute: i64) -> DateTime<FixedOffset> {
    let date = NaiveDate::from_yo_opt(2024, day_of_year).unwrap();
    date.and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(offset_from_hours(timezone).unwrap())
        .single()
        .unwrap()
        + Duration::minutes(minute)
}

fn tracker(lat: f64, lon: f64, offsets: Offsets, now: &DateTime<FixedOffset>) -> SunTracker {
    let location = Location::new(lat, lon, timezone_for(lon));
    SunTracker::init(location, offsets, SolarCalculator::new(), now).unwrap()
}

proptest! {
    /// Sunrise comes before sunset for any non-polar location and date
    #[test]
    fn sunrise_precedes_sunset(
        lat in latitude_strategy(),
        lon in longitude_strategy(),
        (day, minute) in instant_strategy(),
        offsets in offsets_strategy(),
    ) {
        let now = local_instant(timezone_for(lon), day, minute);
        let tracker = tracker(lat, lon, offsets, &now);

        let record = tracker.day_record().unwrap();
        prop_assert!(record.sunrise() < record.sunset());
        prop_assert_eq!(record.date(), now.date_naive());
    }

    /// The sun is up exactly when now lies strictly between the boundaries
    #[test]
    fn state_matches_boundaries(
        lat in latitude_strategy(),
        lon in longitude_strategy(),
        (day, minute) in instant_strategy(),
        offsets in offsets_strategy(),
    ) {
        let now = local_instant(timezone_for(lon), day, minute);
        let tracker = tracker(lat, lon, offsets, &now);

        let record = tracker.day_record().unwrap();
        let expected = if record.sunrise() < now && now < record.sunset() {
            SunState::Up
        } else {
            SunState::Down
        };
        prop_assert_eq!(tracker.sun_state(), expected);
    }

    /// Progress stays in [0, 1] and never falls while the phase lasts
    #[test]
    fn progress_is_bounded_and_non_decreasing(
        lat in latitude_strategy(),
        lon in longitude_strategy(),
        (day, minute) in instant_strategy(),
        step in 1i64..120,
    ) {
        let now = local_instant(timezone_for(lon), day, minute);
        let later = now + Duration::minutes(step);
        let tracker = tracker(lat, lon, Offsets::default(), &now);

        let phase = tracker.phase(&now).unwrap();
        let progress = tracker.progress(&now).unwrap();
        prop_assert!((0.0..=1.0).contains(&progress));
        prop_assert_eq!(phase.state, tracker.sun_state());

        if later <= phase.end {
            let later_progress = tracker.progress(&later).unwrap();
            prop_assert!(later_progress >= progress);
        }
    }

    /// The countdown shrinks by exactly the elapsed time within a phase
    #[test]
    fn countdown_tracks_elapsed_time(
        lat in latitude_strategy(),
        lon in longitude_strategy(),
        (day, minute) in instant_strategy(),
        step in 1i64..120,
    ) {
        let now = local_instant(timezone_for(lon), day, minute);
        let later = now + Duration::minutes(step);
        let mut tracker = tracker(lat, lon, Offsets::default(), &now);

        let phase = tracker.phase(&now).unwrap();
        let remaining = tracker.time_to_next_change(&now).unwrap();
        prop_assert_eq!(remaining, (phase.end - now).to_std().unwrap());

        if later <= phase.end {
            tracker.tick(&later).unwrap();
            let later_remaining = tracker.time_to_next_change(&later).unwrap();
            let elapsed = Duration::minutes(step).to_std().unwrap();
            prop_assert_eq!(remaining - later_remaining, elapsed);
        }
    }

    /// Identical inputs give identical provider outputs
    #[test]
    fn provider_is_deterministic(
        lat in latitude_strategy(),
        lon in longitude_strategy(),
        (day, _) in instant_strategy(),
    ) {
        let date = NaiveDate::from_yo_opt(2024, day).unwrap();
        let run = || {
            let mut provider = SolarCalculator::new();
            provider.set_position(lat, lon, timezone_for(lon));
            provider.set_date(date.year(), date.month(), date.day());
            (provider.calc_sunrise(), provider.calc_sunset())
        };

        let first = run();
        prop_assert!(first.0.is_some() && first.1.is_some());
        prop_assert_eq!(first, run());
    }
}
