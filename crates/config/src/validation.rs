//! Configuration validation
//!
//! Validates values serde cannot check on its own:
//! - Key overrides are non-empty when present
//! - The timestamp pattern override is non-empty when present
//! - `reserved_events` is within bounds

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::reader::{MAX_RESERVED_EVENTS, ReaderConfig};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_reader(&config.reader)?;
    Ok(())
}

/// Validate reader overrides
fn validate_reader(reader: &ReaderConfig) -> Result<()> {
    for (field, value) in [
        ("log_level_key", &reader.log_level_key),
        ("timestamp_key", &reader.timestamp_key),
        ("timestamp_pattern", &reader.timestamp_pattern),
    ] {
        if value.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::empty_field("reader", field));
        }
    }

    if reader.reserved_events == 0 {
        return Err(ConfigError::invalid_value(
            "reader",
            "reserved_events",
            "must be greater than 0",
        ));
    }

    if reader.reserved_events > MAX_RESERVED_EVENTS {
        return Err(ConfigError::invalid_value(
            "reader",
            "reserved_events",
            format!("must be at most {}", MAX_RESERVED_EVENTS),
        ));
    }

    Ok(())
}
