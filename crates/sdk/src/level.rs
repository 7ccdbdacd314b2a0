//! Log severity levels
//!
//! Ordinals are part of the persisted configuration (`minimum_log_level`)
//! and of every formatted log line, so they must never be renumbered.

use std::fmt;

/// Severity of a log message, ordered from least to most important.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Information = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
    /// Threshold only: a minimum level of `None` disables all output
    None = 6,
}

impl LogLevel {
    /// All levels in ascending order
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::None,
    ];

    /// Numeric ordinal used in configuration and log prefixes
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// Convert a stored ordinal back to a level
    ///
    /// Returns `None` for values outside `0..=6`.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.ordinal() == ordinal)
    }

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
            LogLevel::None => "None",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
