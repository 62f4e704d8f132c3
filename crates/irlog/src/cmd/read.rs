//! Read command - Decode an IR stream to text or JSON lines
//!
//! # Usage
//!
//! ```bash
//! irlog read app.clp.zst                      # every event, text
//! irlog read app.clp.zst -l warn -l error     # filtered view
//! irlog read app.clp.zst --begin 100 --end 200 --json
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use irlog_config::{Config, OutputFormat};
use irlog_protocol::{DecodedLogEvent, LogLevel};

use super::{open_stream, reader_options};

/// Read command arguments
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Input stream (raw or Zstandard-compressed)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Only keep events at this level (repeatable)
    #[arg(short = 'l', long = "level", value_name = "LEVEL")]
    levels: Vec<LogLevel>,

    /// First event of the range (inclusive)
    #[arg(long, default_value_t = 0)]
    begin: usize,

    /// End of the range (exclusive). Defaults to every event.
    #[arg(long)]
    end: Option<usize>,

    /// Print one JSON object per event
    #[arg(long)]
    json: bool,

    /// Prefix each text line with its 1-based event number
    #[arg(long)]
    event_numbers: bool,

    /// Key holding the log level (structured streams). Overrides config file.
    #[arg(long)]
    log_level_key: Option<String>,

    /// Key holding the timestamp (structured streams). Overrides config file.
    #[arg(long)]
    timestamp_key: Option<String>,
}

/// Run the read command
pub fn run(args: ReadArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let mut options = reader_options(&config.reader);
    if args.log_level_key.is_some() {
        options.log_level_key = args.log_level_key;
    }
    if args.timestamp_key.is_some() {
        options.timestamp_key = args.timestamp_key;
    }

    let mut reader = open_stream(&args.input, options)?;

    let use_filter = !args.levels.is_empty();
    if use_filter {
        reader.filter_log_events(Some(args.levels.as_slice()));
    }
    let available = reader
        .filtered_log_event_map()
        .map_or(reader.num_events_buffered(), <[usize]>::len);

    let end = args.end.unwrap_or(available);
    let events = reader
        .decode_range(args.begin, end, use_filter)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "range [{}, {}) is out of bounds ({} events available)",
                args.begin,
                end,
                available
            )
        })?;
    tracing::debug!(count = events.len(), begin = args.begin, end, "decoded range");

    let format = if args.json {
        OutputFormat::Json
    } else {
        config.output.format
    };
    let event_numbers = args.event_numbers || config.output.event_numbers;

    for event in &events {
        write_event(out, event, format, event_numbers)?;
    }

    Ok(())
}

/// Write one decoded event as a single line
fn write_event(
    out: &mut impl Write,
    event: &DecodedLogEvent,
    format: OutputFormat,
    event_numbers: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, event).context("failed to serialize event")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            // Unstructured messages usually carry their own newline
            let message = event.message.trim_end_matches(['\r', '\n']);
            if event_numbers {
                writeln!(out, "{}\t{}", event.event_num, message)?;
            } else {
                writeln!(out, "{}", message)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "read_test.rs"]
mod read_test;
