//! IR stream deserialization
//!
//! # Module Structure
//!
//! - `preamble` - Encoding magic and metadata block
//! - `unstructured` - Logtype + variables records
//! - `structured` - Schema-tree and key-value records
//! - `primitives` - Big-endian read helpers
//!
//! A deserializer pulls one record per call and reports what it was. The
//! caller decides what to buffer and when to stop.

mod preamble;
mod primitives;
mod structured;
mod unstructured;

use std::io::Read;

pub use preamble::{Preamble, StreamKind, StreamMetadata, read_encoding_type, read_metadata};

pub(crate) use structured::{AuthoritativeKeys, StructuredDeserializer};
pub(crate) use unstructured::UnstructuredDeserializer;

use crate::Result;
use crate::event::BufferedLogEvent;
use crate::schema::{NodeId, SchemaTree};

/// One record pulled from the stream
#[derive(Debug)]
pub(crate) enum IrUnit {
    LogEvent(BufferedLogEvent),
    SchemaTreeNodeInsertion(NodeId),
    /// New UTC offset in seconds
    UtcOffsetChange(i64),
    EndOfStream,
}

/// Record deserializer for one stream kind
#[derive(Debug)]
pub(crate) enum Deserializer {
    Unstructured(UnstructuredDeserializer),
    Structured(StructuredDeserializer),
}

impl Deserializer {
    /// Create the deserializer for a parsed preamble
    ///
    /// Key names apply to structured streams only.
    pub(crate) fn new(
        preamble: &Preamble,
        log_level_key: Option<String>,
        timestamp_key: Option<String>,
    ) -> Result<Self> {
        Ok(match preamble.kind {
            StreamKind::Unstructured => {
                Self::Unstructured(UnstructuredDeserializer::new(preamble)?)
            }
            StreamKind::Structured => Self::Structured(StructuredDeserializer::new(
                AuthoritativeKeys::new(log_level_key, timestamp_key),
            )),
        })
    }

    /// Pull the next record
    pub(crate) fn deserialize_next<R: Read>(
        &mut self,
        reader: &mut R,
        schema_tree: &mut SchemaTree,
    ) -> Result<IrUnit> {
        match self {
            Self::Unstructured(deserializer) => deserializer.deserialize_next(reader),
            Self::Structured(deserializer) => deserializer.deserialize_next(reader, schema_tree),
        }
    }
}
