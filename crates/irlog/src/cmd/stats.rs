//! Stats command - Summarize an IR stream
//!
//! # Usage
//!
//! ```bash
//! irlog stats app.clp.zst
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use irlog_config::Config;
use irlog_protocol::{LogLevel, StreamReader};

use super::{open_stream, reader_options};

/// Stats command arguments
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Input stream (raw or Zstandard-compressed)
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

/// Run the stats command
pub fn run(args: StatsArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let reader = open_stream(&args.input, reader_options(&config.reader))?;
    write_stats(&reader, out)
}

/// Count buffered events per level, in level-table order
fn level_histogram(reader: &StreamReader) -> [usize; LogLevel::ALL.len()] {
    let mut counts = [0usize; LogLevel::ALL.len()];
    for event in reader.events() {
        counts[usize::from(event.level().as_u8())] += 1;
    }
    counts
}

fn write_stats(reader: &StreamReader, out: &mut impl Write) -> Result<()> {
    writeln!(out, "version:   {}", reader.metadata().version)?;
    writeln!(out, "kind:      {}", reader.kind())?;
    writeln!(out, "encoding:  {}", reader.encoding_width())?;
    writeln!(out, "status:    {}", reader.status())?;
    writeln!(out, "events:    {}", reader.num_events_buffered())?;
    writeln!(out, "pattern:   {}", reader.timestamp_pattern().pattern())?;
    writeln!(out)?;

    for (level, count) in LogLevel::ALL.iter().zip(level_histogram(reader)) {
        writeln!(out, "{:<8}{:>10}", level.as_str(), count)?;
    }

    Ok(())
}
