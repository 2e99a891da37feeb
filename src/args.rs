//! Command-line argument parsing and processing.
//!
//! Arguments are declared with clap's derive API and then folded into a
//! [`CliAction`] so the main loop only has to match on what to do.

use clap::Parser;
use std::path::PathBuf;

/// Track whether the sun is up and report sunrise/sunset transitions.
#[derive(Debug, Parser)]
#[command(name = "sunwatch", version, about)]
pub struct Cli {
    /// Read settings from this file instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable detailed debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Print the current sun status and exit
    #[arg(short, long, conflicts_with = "simulate")]
    pub once: bool,

    /// Evaluate at this local time ("YYYY-MM-DD HH:MM:SS") instead of now
    #[arg(short, long, value_name = "DATETIME")]
    pub at: Option<String>,

    /// Fast-forward through this many hours, printing every transition
    #[arg(short, long, value_name = "HOURS")]
    pub simulate: Option<f64>,
}

/// What the application should do once arguments are parsed.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Keep running, ticking the tracker until interrupted
    Watch,
    /// Print status for one instant and exit
    Status { at: Option<String> },
    /// Step a manual clock through a span of time
    Simulate { start: Option<String>, hours: f64 },
}

/// Result of parsing command-line arguments.
#[derive(Debug)]
pub struct ParsedArgs {
    pub action: CliAction,
    pub debug_enabled: bool,
    pub config_path: Option<PathBuf>,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name, as with `std::env::args()`.
    /// Help and version requests come back as `Err` and are printed by
    /// `clap::Error::exit`.
    pub fn parse<I, S>(args: I) -> Result<ParsedArgs, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        Ok(Self::from_cli(cli))
    }

    fn from_cli(cli: Cli) -> ParsedArgs {
        let action = match (cli.simulate, cli.once, cli.at) {
            (Some(hours), _, start) => CliAction::Simulate { start, hours },
            (None, true, at) => CliAction::Status { at },
            // A fixed instant only makes sense as a one-shot evaluation
            (None, false, Some(at)) => CliAction::Status { at: Some(at) },
            (None, false, None) => CliAction::Watch,
        };

        ParsedArgs {
            action,
            debug_enabled: cli.debug,
            config_path: cli.config,
        }
    }
}
