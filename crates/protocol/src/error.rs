//! IR decoding error types
//!
//! Errors that can occur when opening, deserializing or rendering an IR stream.

use std::io;

use thiserror::Error;

/// Errors that can occur during IR stream operations
#[derive(Debug, Error)]
pub enum IrError {
    /// Encoding-type magic or metadata block is malformed
    #[error("metadata corrupted: {0}")]
    MetadataCorrupted(String),

    /// Recognized encoding width or version without a deserialization strategy
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Malformed record in the event section
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// Input ended in the middle of a record
    #[error("truncated stream: input ended in the middle of a record")]
    TruncatedStream,

    /// A single event's logtype doesn't match its variables
    #[error("failed to decode message: {0}")]
    MessageDecodingFailure(String),
}

impl IrError {
    /// Create a metadata corrupted error
    #[inline]
    pub fn metadata_corrupted(msg: impl Into<String>) -> Self {
        Self::MetadataCorrupted(msg.into())
    }

    /// Create an unsupported encoding error
    #[inline]
    pub fn unsupported_encoding(msg: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(msg.into())
    }

    /// Create a corrupt stream error
    #[inline]
    pub fn corrupt_stream(msg: impl Into<String>) -> Self {
        Self::CorruptStream(msg.into())
    }

    /// Create a message decoding error
    #[inline]
    pub fn message_decoding(msg: impl Into<String>) -> Self {
        Self::MessageDecodingFailure(msg.into())
    }

    /// Reclassify any failure as metadata corruption
    ///
    /// Used while parsing the preamble, where a short read or a bad tag both
    /// mean the stream's framing can't be trusted.
    pub fn into_metadata_corrupted(self) -> Self {
        match self {
            Self::MetadataCorrupted(_) => self,
            other => Self::MetadataCorrupted(other.to_string()),
        }
    }

    /// Check if this is a recoverable error (decoded events stay usable)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TruncatedStream | Self::MessageDecodingFailure(_)
        )
    }
}

impl From<io::Error> for IrError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedStream
        } else {
            Self::CorruptStream(format!("failed to read stream: {err}"))
        }
    }
}
