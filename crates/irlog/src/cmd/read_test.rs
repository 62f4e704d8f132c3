//! Tests for the read command

use super::*;
use std::io::Write as _;
use std::str::FromStr;

use clap::Parser;
use irlog_protocol::testing::{INT, IrStreamWriter};
use irlog_protocol::{NodeType, ROOT_NODE_ID, Value};
use tempfile::NamedTempFile;

// =============================================================================
// Test Helpers
// =============================================================================

const T0: i64 = 1_700_000_000_000;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    args: ReadArgs,
}

/// Four events: INFO, ERROR, INFO, WARN
fn sample_stream() -> IrStreamWriter {
    let mut writer = IrStreamWriter::unstructured_four_byte(T0);
    writer
        .push_event(&format!(" INFO started in {INT} ms\n"), &[12], &[], T0)
        .push_event(" ERROR disk full\n", &[], &[], T0 + 1)
        .push_event(" INFO retrying\n", &[], &[], T0 + 2)
        .push_event(" WARN slow disk\n", &[], &[], T0 + 3)
        .end_of_stream();
    writer
}

fn write_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn read_with(file: &NamedTempFile, extra: &[&str], config: &Config) -> Result<String> {
    let path = file.path().to_str().unwrap();
    let argv = std::iter::once("read").chain(std::iter::once(path)).chain(extra.iter().copied());
    let cli = TestCli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    run(cli.args, config, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn read(file: &NamedTempFile, extra: &[&str]) -> Result<String> {
    read_with(file, extra, &Config::default())
}

// =============================================================================
// Argument parsing tests
// =============================================================================

#[test]
fn test_parse_levels_case_insensitive() {
    let cli = TestCli::try_parse_from(["read", "in.clp", "-l", "error", "--level", "Warn"]).unwrap();
    assert_eq!(cli.args.levels, vec![LogLevel::Error, LogLevel::Warn]);
}

#[test]
fn test_parse_unknown_level_rejected() {
    assert!(TestCli::try_parse_from(["read", "in.clp", "-l", "loud"]).is_err());
}

#[test]
fn test_parse_negative_begin_rejected() {
    assert!(TestCli::try_parse_from(["read", "in.clp", "--begin", "-1"]).is_err());
}

// =============================================================================
// Output tests
// =============================================================================

#[test]
fn test_read_all_text() {
    let file = write_file(&sample_stream().finish());
    let output = read(&file, &[]).unwrap();

    assert_eq!(
        output,
        "2023-11-14 22:13:20,000 INFO started in 12 ms\n\
         2023-11-14 22:13:20,001 ERROR disk full\n\
         2023-11-14 22:13:20,002 INFO retrying\n\
         2023-11-14 22:13:20,003 WARN slow disk\n"
    );
}

#[test]
fn test_read_compressed_input() {
    let plain = write_file(&sample_stream().finish());
    let compressed = write_file(&sample_stream().compressed());
    assert_eq!(read(&compressed, &[]).unwrap(), read(&plain, &[]).unwrap());
}

#[test]
fn test_read_filtered_with_event_numbers() {
    let file = write_file(&sample_stream().finish());
    let output = read(&file, &["-l", "info", "--event-numbers"]).unwrap();

    assert_eq!(
        output,
        "1\t2023-11-14 22:13:20,000 INFO started in 12 ms\n\
         3\t2023-11-14 22:13:20,002 INFO retrying\n"
    );
}

#[test]
fn test_read_range_of_filtered_view() {
    let file = write_file(&sample_stream().finish());
    let output = read(&file, &["-l", "info", "-l", "warn", "--begin", "1", "--end", "3"]).unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("INFO retrying"));
    assert!(lines[1].ends_with("WARN slow disk"));
}

#[test]
fn test_read_json_lines() {
    let file = write_file(&sample_stream().finish());
    let output = read(&file, &["--json", "--begin", "1", "--end", "2"]).unwrap();

    let value: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
    assert_eq!(value["level"], "ERROR");
    assert_eq!(value["event_num"], 2);
    assert_eq!(value["timestamp"], T0 + 1);
    assert_eq!(value["message"], "2023-11-14 22:13:20,001 ERROR disk full\n");
}

#[test]
fn test_read_output_format_from_config() {
    let file = write_file(&sample_stream().finish());
    let config = Config::from_str("[output]\nformat = \"json\"").unwrap();
    let output = read_with(&file, &[], &config).unwrap();

    assert_eq!(output.lines().count(), 4);
    assert!(output.lines().all(|line| line.starts_with('{')));
}

#[test]
fn test_read_empty_range() {
    let file = write_file(&sample_stream().finish());
    assert_eq!(read(&file, &["--begin", "2", "--end", "2"]).unwrap(), "");
}

#[test]
fn test_read_out_of_bounds_range_names_bounds() {
    let file = write_file(&sample_stream().finish());
    let err = read(&file, &["--end", "9"]).unwrap_err();
    assert!(err.to_string().contains("[0, 9)"));

    let err = read(&file, &["-l", "fatal", "--end", "1"]).unwrap_err();
    assert!(err.to_string().contains("0 events available"));
}

#[test]
fn test_read_missing_file() {
    let cli = TestCli::try_parse_from(["read", "/nonexistent/app.clp"]).unwrap();
    let err = run(cli.args, &Config::default(), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn test_read_corrupt_stream_is_error() {
    let mut writer = IrStreamWriter::unstructured_four_byte(T0);
    writer.push_event(" INFO ok\n", &[], &[], T0).push_raw(&[0xEE]);
    let file = write_file(&writer.finish());

    let err = read(&file, &[]).unwrap_err();
    assert!(format!("{:#}", err).contains("failed to decode"));
}

#[test]
fn test_read_truncated_stream_prints_prefix() {
    let mut bytes = sample_stream().finish();
    bytes.truncate(bytes.len() - 3);
    let file = write_file(&bytes);

    let output = read(&file, &[]).unwrap();
    assert_eq!(output.lines().count(), 3);
}

// =============================================================================
// Structured stream tests
// =============================================================================

fn structured_stream(level_key: &str) -> IrStreamWriter {
    let mut writer = IrStreamWriter::structured(level_key, "ts");
    writer
        .push_schema_node(ROOT_NODE_ID, "level", NodeType::Str)
        .push_schema_node(ROOT_NODE_ID, "ts", NodeType::Int)
        .push_schema_node(ROOT_NODE_ID, "msg", NodeType::Str)
        .push_kv_event(&[
            (1, Value::Str("ERROR".into())),
            (2, Value::Int(0)),
            (3, Value::Str("boom".into())),
        ])
        .end_of_stream();
    writer
}

#[test]
fn test_read_structured_stream() {
    let file = write_file(&structured_stream("level").finish());
    let output = read(&file, &["-l", "error"]).unwrap();

    assert_eq!(
        output,
        "1970-01-01T00:00:00.000 {\"level\":\"ERROR\",\"msg\":\"boom\",\"ts\":0}\n"
    );
}

#[test]
fn test_read_log_level_key_override() {
    let file = write_file(&structured_stream("severity").finish());

    assert_eq!(read(&file, &["-l", "error"]).unwrap(), "");
    let output = read(&file, &["-l", "error", "--log-level-key", "level"]).unwrap();
    assert_eq!(output.lines().count(), 1);
}
