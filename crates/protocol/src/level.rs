//! Log levels
//!
//! The level-name table is fixed: index 0 is the reserved "none" entry and
//! the remaining entries are scanned in order when classifying message text.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Level names, indexed by `LogLevel as usize`
pub const LOG_LEVEL_NAMES: [&str; 7] = ["NONE", "TRACE", "DEBUG", "INFO", "WARN", "ERROR", "FATAL"];

/// Log severity levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum LogLevel {
    #[default]
    None = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Fatal = 6,
}

impl LogLevel {
    /// Every level in table order
    pub const ALL: [LogLevel; 7] = [
        Self::None,
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    /// Parse from raw table index
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Trace,
            2 => Self::Debug,
            3 => Self::Info,
            4 => Self::Warn,
            5 => Self::Error,
            6 => Self::Fatal,
            _ => Self::None,
        }
    }

    /// Table index of this level
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        LOG_LEVEL_NAMES[self as usize]
    }

    /// Classify decoded message text by its leading level token
    ///
    /// Exactly one leading character is skipped (the separator that follows
    /// the timestamp in the logged line), then the first table entry after
    /// "none" that prefixes the remainder wins.
    pub fn from_message_prefix(message: &str) -> Self {
        let mut chars = message.chars();
        if chars.next().is_none() {
            return Self::None;
        }
        let rest = chars.as_str();

        Self::ALL[1..]
            .iter()
            .copied()
            .find(|level| rest.starts_with(level.as_str()))
            .unwrap_or(Self::None)
    }

    /// Match a level name exactly, ignoring ASCII case
    ///
    /// Returns `None` for unknown names and for the reserved "none" entry.
    pub fn from_name(name: &str) -> Self {
        Self::ALL[1..]
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(Self::None)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown level name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level '{0}' (expected one of none, trace, debug, info, warn, error, fatal)")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLogLevel(s.to_string()))
    }
}
