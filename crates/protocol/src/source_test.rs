//! Tests for the byte-stream source

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::source::IrSource;

fn payload() -> Vec<u8> {
    (0u8..=255).cycle().take(10_000).collect()
}

fn compressed(data: &[u8]) -> Bytes {
    Bytes::from(zstd::encode_all(data, 3).unwrap())
}

fn read_n(source: &mut IrSource, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    source.read_exact(&mut buf).unwrap();
    buf
}

// =============================================================================
// Raw source tests
// =============================================================================

#[test]
fn test_raw_source_is_not_compressed() {
    let source = IrSource::new(Bytes::from(payload())).unwrap();
    assert!(!source.is_compressed());
}

#[test]
fn test_raw_source_read_and_seek() {
    let data = payload();
    let mut source = IrSource::new(Bytes::from(data.clone())).unwrap();

    assert_eq!(read_n(&mut source, 8), &data[..8]);
    assert_eq!(source.stream_position().unwrap(), 8);

    source.seek(SeekFrom::Start(2)).unwrap();
    assert_eq!(read_n(&mut source, 4), &data[2..6]);
}

#[test]
fn test_empty_raw_source() {
    let mut source = IrSource::new(Bytes::new()).unwrap();
    let mut buf = [0u8; 1];
    assert_eq!(source.read(&mut buf).unwrap(), 0);
}

// =============================================================================
// Zstandard source tests
// =============================================================================

#[test]
fn test_zstd_source_detected() {
    let source = IrSource::new(compressed(&payload())).unwrap();
    assert!(source.is_compressed());
}

#[test]
fn test_zstd_source_reads_decompressed_bytes() {
    let data = payload();
    let mut source = IrSource::new(compressed(&data)).unwrap();

    let mut out = Vec::new();
    source.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
    assert_eq!(source.stream_position().unwrap(), data.len() as u64);
}

#[test]
fn test_zstd_source_seek_forward_and_back() {
    let data = payload();
    let mut source = IrSource::new(compressed(&data)).unwrap();

    assert_eq!(source.seek(SeekFrom::Start(5000)).unwrap(), 5000);
    assert_eq!(read_n(&mut source, 4), &data[5000..5004]);

    assert_eq!(source.seek(SeekFrom::Start(10)).unwrap(), 10);
    assert_eq!(read_n(&mut source, 4), &data[10..14]);

    assert_eq!(source.seek(SeekFrom::Current(-4)).unwrap(), 10);
    assert_eq!(source.stream_position().unwrap(), 10);
}

#[test]
fn test_zstd_source_concatenated_frames() {
    let mut joined = zstd::encode_all(&b"first "[..], 1).unwrap();
    joined.extend(zstd::encode_all(&b"second"[..], 1).unwrap());

    let mut source = IrSource::new(Bytes::from(joined)).unwrap();
    let mut out = String::new();
    source.read_to_string(&mut out).unwrap();
    assert_eq!(out, "first second");
}

#[test]
fn test_zstd_source_seek_past_end() {
    let mut source = IrSource::new(compressed(b"short")).unwrap();
    let err = source.seek(SeekFrom::Start(100)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn test_zstd_source_seek_from_end_unsupported() {
    let mut source = IrSource::new(compressed(b"short")).unwrap();
    let err = source.seek(SeekFrom::End(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_zstd_source_incomplete_frame_errors() {
    let mut data = compressed(&payload()).to_vec();
    let len = data.len();
    data.truncate(len / 2);

    let mut source = IrSource::new(Bytes::from(data)).unwrap();
    let mut out = Vec::new();
    assert!(source.read_to_end(&mut out).is_err());
}
