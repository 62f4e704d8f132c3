//! IR log stream decoder
//!
//! This crate turns compact IR log streams into readable log events:
//! - `StreamReader` - Preamble validation, one-pass build, level filter, range decoding
//! - `IrSource` - Raw or Zstandard-compressed input behind `Read + Seek`
//! - `SchemaTree` - Append-only key tree of structured streams
//! - `LogLevel` - Fixed level-name table and classification
//! - `EncodedVariable` - Integer and float variable codec
//!
//! # Stream Kinds
//!
//! - **Unstructured**: each event is a logtype template, its encoded and
//!   dictionary variables, and a timestamp.
//! - **Structured**: each event maps schema-tree node ids to typed values.
//!   The nodes holding the level and timestamp are named in the metadata.
//!
//! # Usage
//!
//! ```ignore
//! use irlog_protocol::{ReaderOptions, StreamReader};
//!
//! let mut reader = StreamReader::create(std::fs::read("app.clp.zst")?, ReaderOptions::default())?;
//! let count = reader.build()?;
//! for event in reader.decode_range(0, count, false).unwrap_or_default() {
//!     println!("{}", event.message);
//! }
//! ```

mod decode;
mod encoded_var;
mod error;
mod event;
mod level;
mod message;
mod reader;
mod schema;
mod source;
mod timestamp;

pub mod tags;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use decode::{Preamble, StreamKind, StreamMetadata, read_encoding_type, read_metadata};
pub use encoded_var::{EncodedVariable, EncodingWidth};
pub use error::IrError;
pub use event::{
    BufferedLogEvent, DecodedLogEvent, EncodedText, EncodedVars, LogEvent, StructuredLogEvent,
    UnstructuredLogEvent, Value,
};
pub use level::{LOG_LEVEL_NAMES, LogLevel, UnknownLogLevel};
pub use message::{expand_logtype, format_log_event};
pub use reader::{DEFAULT_RESERVED_EVENTS, ReaderOptions, StreamReader, StreamStatus};
pub use schema::{NodeId, NodeLocator, NodeType, ROOT_NODE_ID, SchemaNode, SchemaTree};
pub use source::{IrSource, ZstdSource};
pub use timestamp::{DEFAULT_TIMESTAMP_PATTERN, TimestampPattern};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for IR decoding operations
pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod error_test;
#[cfg(test)]
mod message_test;
#[cfg(test)]
mod schema_test;
#[cfg(test)]
mod source_test;
