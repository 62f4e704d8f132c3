//! irlog - Reader for IR log streams
//!
//! # Usage
//!
//! ```bash
//! # Print every event
//! irlog read app.clp.zst
//!
//! # Only errors, as JSON lines, events 10..20 of the filtered view
//! irlog read app.clp.zst -l error -l fatal --begin 10 --end 20 --json
//!
//! # Stream summary
//! irlog stats app.clp.zst
//! ```

mod cmd;

use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use irlog_config::{Config, LogConfig, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// irlog - Reader for IR log streams
#[derive(Parser, Debug)]
#[command(name = "irlog")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode events and print one line per event
    Read(cmd::read::ReadArgs),

    /// Print stream version, status and a per-level histogram
    Stats(cmd::stats::StatsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log, cli.log_level.as_deref())?;

    // Diagnostics go to stderr; stdout only carries decoded output
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.command {
        Command::Read(args) => cmd::read::run(args, &config, &mut out)?,
        Command::Stats(args) => cmd::stats::run(args, &config, &mut out)?,
    }
    out.flush()?;

    Ok(())
}

/// Load the config file if one was given, defaults otherwise
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Level resolution: CLI flag > config file > default "warn".
fn init_logging(config: &LogConfig, cli_level: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_new(config.resolve_level(cli_level))
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    match config.format {
        LogFormat::Console => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.ansi)
                    .with_writer(io::stderr),
            )
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(io::stderr))
            .with(filter)
            .init(),
    }

    Ok(())
}
