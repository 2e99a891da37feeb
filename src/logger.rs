//! Structured logging system with visual formatting.
//!
//! This module provides the logging facade used across sunwatch. It includes
//! level prefixes for plain messages and box-drawing helpers for the structured
//! status output printed by the binary.
//!
//! Debug lines are only emitted once debug output has been requested.

use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Log level enumeration for categorizing message importance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Log,  // Debug/operational detail, only shown with --debug
    Warn, // Non-fatal issues such as a failed recomputation
    Err,  // Recoverable failures
    Crit, // Failures that stop the program
    Info, // Status updates
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Log => "[LOG] ",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Err => "[ERR] ",
            LogLevel::Crit => "[CRIT] ",
            LogLevel::Info => "[INFO] ",
        }
    }
}

/// Main logging interface providing structured output formatting.
pub struct Log;

impl Log {
    /// Enable or disable `LogLevel::Log` output.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Main log function with level-based prefixes.
    ///
    /// # Arguments
    /// * `level` - LogLevel indicating message importance
    /// * `message` - Text content to log
    pub fn log(level: LogLevel, message: &str) {
        if level == LogLevel::Log && !Self::is_debug() {
            return;
        }

        println!("{}{}", level.prefix(), message);
    }

    // ═══ Convenience Methods for Common Log Levels ═══

    pub fn log_error(message: &str) {
        Self::log(LogLevel::Err, message);
    }

    pub fn log_warning(message: &str) {
        Self::log(LogLevel::Warn, message);
    }

    pub fn log_info(message: &str) {
        Self::log(LogLevel::Info, message);
    }

    /// Log a debug message. Silent unless debug output is enabled.
    pub fn log_debug(message: &str) {
        Self::log(LogLevel::Log, message);
    }

    /// Log a failure that ends the program.
    pub fn log_critical(message: &str) {
        Self::log(LogLevel::Crit, message);
    }

    // ═══ Visual Formatting Functions ═══

    /// Log a decorated message with visual branching indicator.
    pub fn log_decorated(message: &str) {
        println!("┣ {}", message);
    }

    /// Log an indented message for sub-items or details.
    pub fn log_indented(message: &str) {
        println!("┃   {}", message);
    }

    pub fn log_pipe() {
        println!("┃");
    }

    /// Log a block start message with visual separation.
    ///
    /// Used for state changes and new operational phases.
    pub fn log_block_start(message: &str) {
        println!("┃");
        println!("┣ {}", message);
    }

    /// Log the application version header.
    pub fn log_version() {
        println!("┏ sunwatch v{} ━━╸", env!("CARGO_PKG_VERSION"));
        println!("┃");
    }

    /// Log the final termination marker.
    pub fn log_end() {
        println!("╹");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_prefixes() {
        assert_eq!(LogLevel::Warn.prefix(), "[WARN] ");
        assert_eq!(LogLevel::Log.prefix(), "[LOG] ");
        assert_eq!(LogLevel::Crit.prefix(), "[CRIT] ");
    }
}
