//! Tests for message rendering

use serde_json::json;

use crate::IrError;
use crate::event::{
    BufferedLogEvent, EncodedText, EncodedVars, LogEvent, StructuredLogEvent, UnstructuredLogEvent,
    Value,
};
use crate::level::LogLevel;
use crate::message::{expand_logtype, format_log_event};
use crate::schema::{NodeLocator, NodeType, ROOT_NODE_ID, SchemaTree};
use crate::testing::{DICT, FLOAT, INT, encode_four_byte_float, four_byte_text};
use crate::timestamp::TimestampPattern;

fn expand(logtype: &str, encoded: &[i32], dict: &[&str]) -> crate::Result<String> {
    let dict: Vec<String> = dict.iter().map(|s| s.to_string()).collect();
    let mut out = String::new();
    expand_logtype(logtype, encoded, &dict, &mut out)?;
    Ok(out)
}

// =============================================================================
// Logtype expansion tests
// =============================================================================

#[test]
fn test_expand_integer_and_float() {
    let logtype = format!(" INFO connected: {INT} at {FLOAT}");
    let vars = [42, encode_four_byte_float("3.14")];
    assert_eq!(expand(&logtype, &vars, &[]).unwrap(), " INFO connected: 42 at 3.14");
}

#[test]
fn test_expand_dictionary_variables_in_order() {
    let logtype = format!("user {DICT} opened {DICT} ({INT} bytes)");
    assert_eq!(
        expand(&logtype, &[512], &["alice", "/tmp/a b"]).unwrap(),
        "user alice opened /tmp/a b (512 bytes)"
    );
}

#[test]
fn test_expand_literal_only() {
    assert_eq!(expand("plain text", &[], &[]).unwrap(), "plain text");
    assert_eq!(expand("", &[], &[]).unwrap(), "");
}

#[test]
fn test_expand_escaped_placeholder_is_literal() {
    let logtype = format!("a\\{INT}b \\\\ {INT}");
    let out = expand(&logtype, &[7], &[]).unwrap();
    assert_eq!(out, format!("a{INT}b \\ 7"));
}

#[test]
fn test_expand_trailing_escape_fails() {
    let err = expand("broken\\", &[], &[]).unwrap_err();
    assert!(matches!(err, IrError::MessageDecodingFailure(_)));
}

#[test]
fn test_expand_too_few_variables_fails() {
    let logtype = format!("{INT} and {INT}");
    let err = expand(&logtype, &[1], &[]).unwrap_err();
    assert!(matches!(err, IrError::MessageDecodingFailure(_)));

    let logtype = format!("{DICT}");
    assert!(expand(&logtype, &[], &[]).is_err());
}

#[test]
fn test_expand_unused_variables_fail() {
    let err = expand("no placeholders", &[1], &[]).unwrap_err();
    assert!(matches!(err, IrError::MessageDecodingFailure(_)));

    let err = expand("no placeholders", &[], &["x"]).unwrap_err();
    assert!(matches!(err, IrError::MessageDecodingFailure(_)));
}

#[test]
fn test_expand_keeps_multibyte_literals() {
    let logtype = format!("température {INT}°C ✓");
    assert_eq!(expand(&logtype, &[21], &[]).unwrap(), "température 21°C ✓");
}

#[test]
fn test_expand_eight_byte_variables() {
    let logtype = format!("offset {INT}");
    let text = EncodedText {
        logtype,
        encoded_vars: EncodedVars::EightByte(vec![i64::MAX]),
        dict_vars: Vec::new(),
    };
    assert_eq!(text.decode().unwrap(), "offset 9223372036854775807");
}

// =============================================================================
// Structured rendering tests
// =============================================================================

fn sample_tree() -> SchemaTree {
    let mut tree = SchemaTree::new();
    tree.insert_node(NodeLocator::new(ROOT_NODE_ID, "level", NodeType::Str))
        .unwrap(); // 1
    tree.insert_node(NodeLocator::new(ROOT_NODE_ID, "ctx", NodeType::Obj))
        .unwrap(); // 2
    tree.insert_node(NodeLocator::new(2, "pid", NodeType::Int))
        .unwrap(); // 3
    tree.insert_node(NodeLocator::new(2, "load", NodeType::Float))
        .unwrap(); // 4
    tree.insert_node(NodeLocator::new(ROOT_NODE_ID, "tags", NodeType::UnstructuredArray))
        .unwrap(); // 5
    tree.insert_node(NodeLocator::new(ROOT_NODE_ID, "msg", NodeType::Str))
        .unwrap(); // 6
    tree
}

#[test]
fn test_to_json_nests_by_key_path() {
    let tree = sample_tree();
    let event = StructuredLogEvent::new(vec![
        (1, Value::Str("INFO".into())),
        (3, Value::Int(99)),
        (4, Value::Float(0.5)),
        (5, Value::Str("[1,\"a\"]".into())),
    ]);

    assert_eq!(
        event.to_json(&tree).unwrap(),
        json!({"level": "INFO", "ctx": {"pid": 99, "load": 0.5}, "tags": [1, "a"]})
    );
}

#[test]
fn test_to_json_decodes_clp_strings() {
    let tree = sample_tree();
    let text = four_byte_text(&format!("took {INT} ms"), &[15], &[]);
    let event = StructuredLogEvent::new(vec![(6, Value::ClpStr(text))]);
    assert_eq!(event.to_json(&tree).unwrap(), json!({"msg": "took 15 ms"}));
}

#[test]
fn test_to_json_empty_and_null() {
    let tree = sample_tree();
    let event = StructuredLogEvent::new(vec![(2, Value::Empty), (1, Value::Null)]);
    assert_eq!(event.to_json(&tree).unwrap(), json!({"ctx": {}, "level": null}));

    let empty = StructuredLogEvent::default();
    assert_eq!(empty.to_json(&tree).unwrap(), json!({}));
}

#[test]
fn test_to_json_non_finite_float_is_null() {
    let tree = sample_tree();
    let event = StructuredLogEvent::new(vec![(4, Value::Float(f64::NAN))]);
    assert_eq!(event.to_json(&tree).unwrap(), json!({"ctx": {"load": null}}));
}

#[test]
fn test_to_json_bad_unstructured_array_fails() {
    let tree = sample_tree();
    let event = StructuredLogEvent::new(vec![(5, Value::Str("[1,".into()))]);
    let err = event.to_json(&tree).unwrap_err();
    assert!(matches!(err, IrError::MessageDecodingFailure(_)));
}

#[test]
fn test_to_json_unknown_node_fails() {
    let tree = sample_tree();
    let event = StructuredLogEvent::new(vec![(40, Value::Int(1))]);
    assert!(event.to_json(&tree).is_err());
}

// =============================================================================
// format_log_event tests
// =============================================================================

#[test]
fn test_format_unstructured_event_prefixes_timestamp() {
    let tree = SchemaTree::new();
    let pattern = TimestampPattern::parse("%Y-%m-%d %H:%M:%S,%3").unwrap();
    let text = four_byte_text(
        &format!(" INFO connected: {INT} at {FLOAT}"),
        &[42, encode_four_byte_float("3.14")],
        &[],
    );
    let event = BufferedLogEvent::new(
        LogEvent::Unstructured(UnstructuredLogEvent {
            text,
            timestamp: 1_700_000_000_123,
        }),
        LogLevel::Info,
        1_700_000_000_123,
    );

    assert_eq!(
        format_log_event(&event, &tree, &pattern).unwrap(),
        "2023-11-14 22:13:20,123 INFO connected: 42 at 3.14"
    );
}

#[test]
fn test_format_structured_event_is_timestamp_then_json() {
    let tree = sample_tree();
    let pattern = TimestampPattern::parse("%H:%M:%S").unwrap();
    let event = BufferedLogEvent::new(
        LogEvent::Structured(StructuredLogEvent::new(vec![(1, Value::Str("WARN".into()))])),
        LogLevel::Warn,
        0,
    );

    assert_eq!(
        format_log_event(&event, &tree, &pattern).unwrap(),
        "00:00:00 {\"level\":\"WARN\"}"
    );
}
