//! Output configuration

use serde::Deserialize;

/// How decoded events are printed
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One formatted message per line (default)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Output configuration
///
/// # Example
///
/// ```toml
/// [output]
/// format = "json"
/// event_numbers = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format (text, json)
    /// Default: text
    pub format: OutputFormat,

    /// Prefix text lines with the 1-based event number
    /// Default: false
    pub event_numbers: bool,
}
