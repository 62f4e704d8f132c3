//! Tests for IR error types

use std::io;

use crate::error::IrError;

#[test]
fn test_error_creation_metadata_corrupted() {
    let err = IrError::metadata_corrupted("bad magic");
    assert!(matches!(err, IrError::MetadataCorrupted(ref msg) if msg == "bad magic"));
}

#[test]
fn test_error_creation_unsupported_encoding() {
    let err = IrError::unsupported_encoding("version 9.9.9");
    assert!(matches!(err, IrError::UnsupportedEncoding(_)));
}

#[test]
fn test_error_creation_corrupt_stream() {
    let err = IrError::corrupt_stream("unexpected tag 0x7f");
    assert!(matches!(err, IrError::CorruptStream(_)));
}

#[test]
fn test_error_display_truncated() {
    assert_eq!(
        IrError::TruncatedStream.to_string(),
        "truncated stream: input ended in the middle of a record"
    );
}

#[test]
fn test_error_display_message_decoding() {
    let err = IrError::message_decoding("too few encoded variables");
    assert_eq!(
        err.to_string(),
        "failed to decode message: too few encoded variables"
    );
}

#[test]
fn test_error_display_metadata_corrupted() {
    let err = IrError::metadata_corrupted("missing VERSION");
    assert_eq!(err.to_string(), "metadata corrupted: missing VERSION");
}

#[test]
fn test_from_io_unexpected_eof_is_truncation() {
    let err: IrError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
    assert!(matches!(err, IrError::TruncatedStream));
}

#[test]
fn test_from_io_other_is_corruption() {
    let err: IrError = io::Error::other("bad frame").into();
    assert!(matches!(err, IrError::CorruptStream(ref msg) if msg.contains("bad frame")));
}

#[test]
fn test_into_metadata_corrupted_keeps_message() {
    let err = IrError::TruncatedStream.into_metadata_corrupted();
    match err {
        IrError::MetadataCorrupted(msg) => assert!(msg.contains("truncated stream")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_into_metadata_corrupted_is_idempotent() {
    let err = IrError::metadata_corrupted("x").into_metadata_corrupted();
    assert!(matches!(err, IrError::MetadataCorrupted(ref msg) if msg == "x"));
}

#[test]
fn test_recoverable_errors() {
    assert!(IrError::TruncatedStream.is_recoverable());
    assert!(IrError::message_decoding("x").is_recoverable());
    assert!(!IrError::corrupt_stream("x").is_recoverable());
    assert!(!IrError::metadata_corrupted("x").is_recoverable());
    assert!(!IrError::unsupported_encoding("x").is_recoverable());
}
