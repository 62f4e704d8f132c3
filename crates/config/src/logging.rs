//! Logging configuration
//!
//! Diagnostics always go to stderr so decoded events on stdout stay clean.
//! The level can be overridden from the command line.

use std::fmt;

use serde::Deserialize;

/// Minimum level of diagnostics written to stderr
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Stream shape and build progress
    Info,
    /// Ignored records and recoverable problems (default)
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostics format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default)
    #[default]
    Console,
    /// One JSON object per diagnostic
    Json,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "console"
/// ansi = false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default: warn
    pub level: LogLevel,

    /// Default: console
    pub format: LogFormat,

    /// Color console output
    /// Default: true
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Console,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Filter directive: the command-line level if given, else `level`
    pub fn resolve_level(&self, cli_level: Option<&str>) -> String {
        match cli_level {
            Some(level) => level.to_string(),
            None => self.level.as_str().to_string(),
        }
    }
}
