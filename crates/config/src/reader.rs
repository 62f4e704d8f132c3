//! Reader configuration
//!
//! Overrides for what the stream's own metadata says. Unset keys fall back
//! to the metadata.

use serde::Deserialize;

/// Default initial event buffer capacity
pub const DEFAULT_RESERVED_EVENTS: usize = 4096;

/// Largest accepted `reserved_events`
pub const MAX_RESERVED_EVENTS: usize = 50_000_000;

/// Reader configuration
///
/// # Example
///
/// ```toml
/// [reader]
/// log_level_key = "level"
/// timestamp_key = "ts"
/// timestamp_pattern = "%Y-%m-%d %H:%M:%S,%3"
/// reserved_events = 65536
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Key holding the log level in structured streams
    pub log_level_key: Option<String>,

    /// Key holding the timestamp in structured streams
    pub timestamp_key: Option<String>,

    /// Timestamp pattern replacing the stream's
    pub timestamp_pattern: Option<String>,

    /// Initial event buffer capacity
    /// Default: 4096
    pub reserved_events: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            log_level_key: None,
            timestamp_key: None,
            timestamp_pattern: None,
            reserved_events: DEFAULT_RESERVED_EVENTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert!(config.log_level_key.is_none());
        assert!(config.timestamp_key.is_none());
        assert!(config.timestamp_pattern.is_none());
        assert_eq!(config.reserved_events, DEFAULT_RESERVED_EVENTS);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ReaderConfig = toml::from_str("log_level_key = \"severity\"").unwrap();
        assert_eq!(config.log_level_key.as_deref(), Some("severity"));
        assert!(config.timestamp_key.is_none());
        assert_eq!(config.reserved_events, DEFAULT_RESERVED_EVENTS);
    }

    #[test]
    fn test_negative_reserved_events_rejected() {
        let result: Result<ReaderConfig, _> = toml::from_str("reserved_events = -1");
        assert!(result.is_err());
    }
}
