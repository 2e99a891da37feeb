//! Configuration system for sunwatch with validation and default generation.
//!
//! Settings are read from `sunwatch.toml` in the user's configuration
//! directory (`$XDG_CONFIG_HOME/sunwatch/sunwatch.toml` on Linux), or from an
//! explicit path given on the command line. A commented default file is
//! written on first run.
//!
//! ```toml
//! #[Location]
//! latitude = 52.37                  # Degrees, -90 (south) to 90 (north)
//! longitude = 4.9                   # Degrees, -180 (west) to 180 (east)
//! timezone_offset = 1.0             # Hours east of UTC, without daylight saving
//! daylight_saving = false           # Add one hour to the timezone offset
//!
//! #[Boundaries]
//! sunrise_offset = 0                # Minutes to move sunrise earlier (negative delays it)
//! sunset_offset = 0                 # Minutes to move sunset earlier (negative delays it)
//! twilight = "official"             # "official", "civil", "nautical" or "astronomical"
//!
//! #[Polling]
//! update_interval = 60              # Seconds between state checks
//! ```
//!
//! All fields are optional; missing values fall back to the defaults in
//! [`crate::constants`]. Values are validated on load and rejected with a
//! message naming the offending key and its allowed range.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::constants::*;
use crate::geo::Twilight;
use crate::logger::Log;
use crate::sun_state::{Location, Offsets};

/// Settings for the sunwatch application, loaded from `sunwatch.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Hours east of UTC, excluding daylight saving
    pub timezone_offset: Option<f64>,
    /// When true, one hour is added to `timezone_offset`
    pub daylight_saving: Option<bool>,
    pub sunrise_offset: Option<i32>, // minutes
    pub sunset_offset: Option<i32>,  // minutes
    pub twilight: Option<Twilight>,
    pub update_interval: Option<u64>, // seconds
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("sunwatch").join("sunwatch.toml"))
    }

    /// Write a commented configuration file populated with default values.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = ConfigBuilder::new()
            .add_section("Location")
            .add_setting(
                "latitude",
                &format!("{:.2}", DEFAULT_LATITUDE),
                "Degrees, -90 (south) to 90 (north)",
            )
            .add_setting(
                "longitude",
                &format!("{:.2}", DEFAULT_LONGITUDE),
                "Degrees, -180 (west) to 180 (east)",
            )
            .add_setting(
                "timezone_offset",
                &format!("{:.1}", DEFAULT_TIMEZONE_OFFSET),
                "Hours east of UTC, without daylight saving",
            )
            .add_setting(
                "daylight_saving",
                &DEFAULT_DAYLIGHT_SAVING.to_string(),
                "Add one hour to the timezone offset",
            )
            .add_section("Boundaries")
            .add_setting(
                "sunrise_offset",
                &DEFAULT_SUNRISE_OFFSET.to_string(),
                "Minutes to move sunrise earlier (negative delays it)",
            )
            .add_setting(
                "sunset_offset",
                &DEFAULT_SUNSET_OFFSET.to_string(),
                "Minutes to move sunset earlier (negative delays it)",
            )
            .add_setting(
                "twilight",
                &format!("\"{}\"", DEFAULT_TWILIGHT),
                "\"official\", \"civil\", \"nautical\" or \"astronomical\"",
            )
            .add_section("Polling")
            .add_setting(
                "update_interval",
                &DEFAULT_UPDATE_INTERVAL.to_string(),
                &format!(
                    "Seconds between state checks ({}-{})",
                    MINIMUM_UPDATE_INTERVAL, MAXIMUM_UPDATE_INTERVAL
                ),
            )
            .build();

        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;

        Ok(())
    }

    /// Load the configuration from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            Log::log_indented(&format!(
                "Created default configuration at {}",
                config_path.display()
            ));
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Load from a specific path. Does not create the file if it is missing.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.apply_defaults();
        validate_config(&config)?;

        Ok(config)
    }

    fn apply_defaults(&mut self) {
        self.latitude.get_or_insert(DEFAULT_LATITUDE);
        self.longitude.get_or_insert(DEFAULT_LONGITUDE);
        self.timezone_offset.get_or_insert(DEFAULT_TIMEZONE_OFFSET);
        self.daylight_saving.get_or_insert(DEFAULT_DAYLIGHT_SAVING);
        self.sunrise_offset.get_or_insert(DEFAULT_SUNRISE_OFFSET);
        self.sunset_offset.get_or_insert(DEFAULT_SUNSET_OFFSET);
        self.twilight.get_or_insert_with(Twilight::default);
        self.update_interval.get_or_insert(DEFAULT_UPDATE_INTERVAL);
    }

    /// Effective UTC offset in hours, including the daylight-saving hour.
    pub fn effective_timezone_offset(&self) -> f64 {
        let base = self.timezone_offset.unwrap_or(DEFAULT_TIMEZONE_OFFSET);
        if self.daylight_saving.unwrap_or(DEFAULT_DAYLIGHT_SAVING) {
            base + DAYLIGHT_SAVING_HOURS
        } else {
            base
        }
    }

    pub fn location(&self) -> Location {
        Location::new(
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
            self.effective_timezone_offset(),
        )
    }

    pub fn offsets(&self) -> Offsets {
        Offsets::new(
            self.sunrise_offset.unwrap_or(DEFAULT_SUNRISE_OFFSET) as f64,
            self.sunset_offset.unwrap_or(DEFAULT_SUNSET_OFFSET) as f64,
        )
    }

    pub fn twilight(&self) -> Twilight {
        self.twilight.unwrap_or_default()
    }

    pub fn update_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL))
    }

    pub fn log_config(&self, path: Option<&Path>) {
        match path {
            Some(path) => Log::log_block_start(&format!(
                "Loaded configuration from {}",
                path.display()
            )),
            None => Log::log_block_start("Loaded configuration"),
        }

        let location = self.location();
        let lat_dir = if location.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if location.longitude >= 0.0 { "E" } else { "W" };
        Log::log_indented(&format!(
            "Location: {:.4}°{}, {:.4}°{}",
            location.latitude.abs(),
            lat_dir,
            location.longitude.abs(),
            lon_dir
        ));
        Log::log_indented(&format!(
            "UTC offset: {:+} hours{}",
            location.timezone_offset_hours,
            if self.daylight_saving.unwrap_or(DEFAULT_DAYLIGHT_SAVING) {
                " (daylight saving)"
            } else {
                ""
            }
        ));

        let offsets = self.offsets();
        Log::log_indented(&format!(
            "Sunrise offset: {} minutes",
            offsets.sunrise_minutes
        ));
        Log::log_indented(&format!("Sunset offset: {} minutes", offsets.sunset_minutes));
        Log::log_indented(&format!("Twilight: {}", self.twilight()));
        Log::log_indented(&format!(
            "Update interval: {} seconds",
            self.update_interval().as_secs()
        ));
    }
}

/// Reject values outside their allowed ranges.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude {
        if !(MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&lat) {
            anyhow::bail!("Latitude must be between -90 and 90 degrees (got {})", lat);
        }
    }

    if let Some(lon) = config.longitude {
        if !(MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&lon) {
            anyhow::bail!(
                "Longitude must be between -180 and 180 degrees (got {})",
                lon
            );
        }
    }

    let offset = config.effective_timezone_offset();
    if !offset.is_finite() || offset.abs() > MAXIMUM_TIMEZONE_OFFSET_HOURS {
        anyhow::bail!(
            "timezone_offset (including daylight saving) must be between -{} and {} hours (got {})",
            MAXIMUM_TIMEZONE_OFFSET_HOURS,
            MAXIMUM_TIMEZONE_OFFSET_HOURS,
            offset
        );
    }

    for (key, value) in [
        ("sunrise_offset", config.sunrise_offset),
        ("sunset_offset", config.sunset_offset),
    ] {
        if let Some(minutes) = value {
            if minutes.abs() > MAXIMUM_BOUNDARY_OFFSET_MINUTES {
                anyhow::bail!(
                    "{} must be between -{} and {} minutes (got {})",
                    key,
                    MAXIMUM_BOUNDARY_OFFSET_MINUTES,
                    MAXIMUM_BOUNDARY_OFFSET_MINUTES,
                    minutes
                );
            }
        }
    }

    if let Some(interval) = config.update_interval {
        if !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval) {
            anyhow::bail!(
                "update_interval must be between {} and {} seconds (got {})",
                MINIMUM_UPDATE_INTERVAL,
                MAXIMUM_UPDATE_INTERVAL,
                interval
            );
        }
    }

    Ok(())
}

/// Builds a TOML file of sections and settings with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{}]", title)));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.join("\n")
    }
}
