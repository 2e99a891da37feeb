use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset};
use signal_hook::{
    consts::signal::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    path::PathBuf,
    rc::Rc,
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration as StdDuration,
};

use sunwatch::args::{CliAction, ParsedArgs};
use sunwatch::clock::{Clock, ManualClock, SystemClock, offset_from_hours, parse_datetime};
use sunwatch::constants::*;
use sunwatch::schedule::next_check_in;
use sunwatch::utils::{format_clock_time, format_duration, progress_bar};
use sunwatch::{Config, Log, SolarCalculator, SunState, SunTracker};

const CHECK_INTERVAL: StdDuration = StdDuration::from_secs(CHECK_INTERVAL_SECS);

fn main() {
    let args = match ParsedArgs::parse(std::env::args()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    Log::set_debug(args.debug_enabled);

    if let Err(e) = run(args) {
        Log::log_pipe();
        Log::log_critical(&format!("{:#}", e));
        Log::log_end();
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(args: ParsedArgs) -> Result<()> {
    Log::log_version();

    let (config, config_path) = load_config(args.config_path)?;
    config.log_config(Some(&config_path));

    let offset = offset_from_hours(config.effective_timezone_offset())
        .context("Configured timezone offset is not representable")?;

    match args.action {
        CliAction::Status { at } => {
            let now = resolve_start(at.as_deref(), offset)?;
            let tracker = build_tracker(&config, &now)?;
            log_status(&tracker, now);
        }
        CliAction::Simulate { start, hours } => {
            let start = resolve_start(start.as_deref(), offset)?;
            simulate(&config, start, hours)?;
        }
        CliAction::Watch => watch(&config, offset)?,
    }

    Log::log_end();
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    match path {
        Some(path) => Ok((Config::load_from_path(&path)?, path)),
        None => Ok((Config::load()?, Config::get_config_path()?)),
    }
}

fn resolve_start(at: Option<&str>, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
    match at {
        Some(s) => parse_datetime(s, offset),
        None => Ok(SystemClock.now().with_timezone(&offset)),
    }
}

fn build_tracker(config: &Config, now: &DateTime<FixedOffset>) -> Result<SunTracker> {
    let provider = SolarCalculator::new().with_twilight(config.twilight());
    SunTracker::init(config.location(), config.offsets(), provider, now)
        .context("Failed to initialize sun tracker")
}

/// Log state, today's boundaries, phase progress and countdown at `now`.
fn log_status(tracker: &SunTracker, now: DateTime<FixedOffset>) {
    Log::log_block_start(&format!(
        "The sun is {} at {}",
        tracker.sun_state(),
        now.format(DATETIME_FORMAT)
    ));

    match tracker.day_record() {
        Some(record) => {
            Log::log_indented(&format!(
                "Sunrise at {}, sunset at {} ({} of daylight)",
                format_clock_time(record.sunrise()),
                format_clock_time(record.sunset()),
                format_duration(record.day_length().to_std().unwrap_or_default())
            ));
        }
        None => {
            Log::log_indented("No sunrise or sunset could be computed for this date");
            if let Some(e) = tracker.last_error() {
                Log::log_error(&format!("{}", e));
            }
        }
    }

    if let (Some(phase), Some(progress)) = (tracker.phase(&now), tracker.progress(&now)) {
        let label = if phase.state == SunState::Up { "Day" } else { "Night" };
        Log::log_indented(&format!("{} {}", label, progress_bar(progress)));
        Log::log_indented(&format!(
            "Next change in {}",
            format_duration(phase.remaining(now))
        ));
    }
}

/// Step a manual clock through `hours`, ticking every update interval.
fn simulate(config: &Config, start: DateTime<FixedOffset>, hours: f64) -> Result<()> {
    if !hours.is_finite() || hours <= 0.0 {
        anyhow::bail!("Simulation span must be a positive number of hours (got {})", hours);
    }

    let clock = Rc::new(ManualClock::new(start));
    let end = start + Duration::milliseconds((hours * 3_600_000.0).round() as i64);
    let step = Duration::from_std(config.update_interval())
        .context("Update interval is too large to simulate")?;

    let mut tracker = build_tracker(config, &start)?;
    log_status(&tracker, start);

    let transition_clock = Rc::clone(&clock);
    tracker.subscribe(move |state| {
        Log::log_decorated(&format!(
            "{}: the sun is now {}",
            transition_clock.now().format(DATETIME_FORMAT),
            state
        ));
    });

    Log::log_block_start(&format!(
        "Simulating {} hours in {} second steps",
        hours,
        config.update_interval().as_secs()
    ));

    while clock.now() < end {
        clock.advance(step);
        if let Err(e) = tracker.tick(&clock.now()) {
            Log::log_debug(&format!("Tick failed: {}", e));
        }
    }

    log_status(&tracker, clock.now());
    Log::log_indented(&format!(
        "Day boundaries recomputed {} times",
        tracker.recomputations()
    ));
    Ok(())
}

/// Poll the system clock until SIGINT or SIGTERM.
fn watch(config: &Config, offset: FixedOffset) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    thread::spawn(move || {
        for signal in signals.forever() {
            Log::log_pipe();
            Log::log_info(&format!("Shutdown signal received: {:?}", signal));
            r.store(false, Ordering::SeqCst);
        }
    });

    let clock = SystemClock;
    let now = clock.now().with_timezone(&offset);
    let mut tracker = build_tracker(config, &now)?;
    log_status(&tracker, now);

    tracker.subscribe(|state| {
        Log::log_block_start(&format!("The sun is now {}", state));
    });

    while running.load(Ordering::SeqCst) {
        let now = clock.now().with_timezone(&offset);

        match tracker.tick(&now) {
            Ok(Some(_)) => {
                if let Some(remaining) = tracker.time_to_next_change(&now) {
                    Log::log_indented(&format!("Next change in {}", format_duration(remaining)));
                }
            }
            Ok(None) => {}
            Err(e) => Log::log_debug(&format!("Tick failed: {}", e)),
        }

        let sleep_duration = next_check_in(
            now,
            tracker.time_to_next_change(&now),
            config.update_interval(),
        );
        Log::log_debug(&format!("Next check in {}", format_duration(sleep_duration)));

        // Sleep in smaller intervals to check running status
        let mut slept = StdDuration::ZERO;
        while slept < sleep_duration && running.load(Ordering::SeqCst) {
            let sleep_chunk = CHECK_INTERVAL.min(sleep_duration - slept);
            thread::sleep(sleep_chunk);
            slept += sleep_chunk;
        }
    }

    Log::log_block_start("Shutting down sunwatch...");
    Ok(())
}
