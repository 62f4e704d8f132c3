//! Command implementations for the irlog CLI

pub mod read;
pub mod stats;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use irlog_config::ReaderConfig;
use irlog_protocol::{ReaderOptions, StreamReader};

/// Convert the `[reader]` config section into protocol reader options
pub fn reader_options(config: &ReaderConfig) -> ReaderOptions {
    ReaderOptions {
        log_level_key: config.log_level_key.clone(),
        timestamp_key: config.timestamp_key.clone(),
        timestamp_pattern: config.timestamp_pattern.clone(),
        reserved_events: config.reserved_events,
    }
}

/// Load a stream file and run the build pass
pub fn open_stream(input: &Path, options: ReaderOptions) -> Result<StreamReader> {
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let mut reader = StreamReader::create(data, options)
        .with_context(|| format!("failed to open IR stream {}", input.display()))?;
    reader
        .build()
        .with_context(|| format!("failed to decode {}", input.display()))?;

    Ok(reader)
}
