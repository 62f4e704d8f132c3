//! Preamble parsing
//!
//! The preamble is the encoding-type magic followed by the metadata block.
//! Parsing leaves the source at the first record on success and restores the
//! starting position on failure.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::primitives::{read_array, read_string, read_u8, read_u16};
use crate::encoded_var::EncodingWidth;
use crate::tags::{
    EIGHT_BYTE_ENCODING_MAGIC, FOUR_BYTE_ENCODING_MAGIC, STRUCTURED_VERSIONS,
    UNSTRUCTURED_VERSIONS, metadata,
};
use crate::{IrError, Result};

/// Deserialization strategy selected by the stream version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Logtype + variables events
    Unstructured,
    /// Key-value events over a schema tree
    Structured,
}

impl StreamKind {
    /// Map a protocol version to its strategy
    pub fn from_version(version: &str) -> Option<Self> {
        if UNSTRUCTURED_VERSIONS.contains(&version) {
            Some(Self::Unstructured)
        } else if STRUCTURED_VERSIONS.contains(&version) {
            Some(Self::Structured)
        } else {
            None
        }
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstructured => "unstructured",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata carried by the stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamMetadata {
    pub version: String,
    pub timestamp_pattern: Option<String>,
    pub timestamp_pattern_syntax: Option<String>,
    pub tz_id: Option<String>,
    /// Base for four-byte timestamp deltas, epoch milliseconds
    pub reference_timestamp: Option<i64>,
    pub log_level_key: Option<String>,
    pub timestamp_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(rename = "VERSION")]
    version: Option<String>,
    #[serde(rename = "TIMESTAMP_PATTERN")]
    timestamp_pattern: Option<String>,
    #[serde(rename = "TIMESTAMP_PATTERN_SYNTAX")]
    timestamp_pattern_syntax: Option<String>,
    #[serde(rename = "TZ_ID")]
    tz_id: Option<String>,
    #[serde(rename = "REFERENCE_TIMESTAMP")]
    reference_timestamp: Option<JsonValue>,
    #[serde(rename = "LOG_LEVEL_KEY")]
    log_level_key: Option<String>,
    #[serde(rename = "TIMESTAMP_KEY")]
    timestamp_key: Option<String>,
}

impl StreamMetadata {
    /// Parse the metadata JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: JsonValue = serde_json::from_str(json)
            .map_err(|e| IrError::metadata_corrupted(format!("metadata is not JSON: {e}")))?;
        if !document.is_object() {
            return Err(IrError::metadata_corrupted("metadata is not a JSON object"));
        }

        let raw: RawMetadata = serde_json::from_value(document)
            .map_err(|e| IrError::metadata_corrupted(format!("invalid metadata: {e}")))?;

        let version = raw.version.ok_or_else(|| {
            IrError::metadata_corrupted(format!("metadata has no {}", metadata::VERSION_KEY))
        })?;

        let reference_timestamp = raw
            .reference_timestamp
            .map(|value| parse_reference_timestamp(&value))
            .transpose()?;

        Ok(Self {
            version,
            timestamp_pattern: raw.timestamp_pattern,
            timestamp_pattern_syntax: raw.timestamp_pattern_syntax,
            tz_id: raw.tz_id,
            reference_timestamp,
            log_level_key: raw.log_level_key,
            timestamp_key: raw.timestamp_key,
        })
    }
}

fn parse_reference_timestamp(value: &JsonValue) -> Result<i64> {
    let parsed = match value {
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        JsonValue::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        IrError::metadata_corrupted(format!(
            "{} is not an integer: {value}",
            metadata::REFERENCE_TIMESTAMP_KEY
        ))
    })
}

/// Encoding width and metadata of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub width: EncodingWidth,
    pub kind: StreamKind,
    pub metadata: StreamMetadata,
}

impl Preamble {
    /// Parse the preamble from the current position
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader
            .stream_position()
            .map_err(|e| IrError::from(e).into_metadata_corrupted())?;

        let result = Self::parse_inner(reader);
        if result.is_err() {
            if let Err(e) = reader.seek(SeekFrom::Start(start)) {
                tracing::warn!(error = %e, position = start, "failed to restore source position");
            }
        }
        result
    }

    fn parse_inner<R: Read>(reader: &mut R) -> Result<Self> {
        let width = read_encoding_type(reader)?;
        let metadata = read_metadata(reader)?;

        let kind = StreamKind::from_version(&metadata.version).ok_or_else(|| {
            IrError::unsupported_encoding(format!("unsupported version '{}'", metadata.version))
        })?;
        if kind == StreamKind::Structured && width == EncodingWidth::EightByte {
            return Err(IrError::unsupported_encoding(format!(
                "version {} has no {} encoding",
                metadata.version, width
            )));
        }

        Ok(Self {
            width,
            kind,
            metadata,
        })
    }
}

/// Read the four-byte encoding-type magic
pub fn read_encoding_type<R: Read>(reader: &mut R) -> Result<EncodingWidth> {
    let magic: [u8; 4] = read_array(reader).map_err(IrError::into_metadata_corrupted)?;
    match magic {
        FOUR_BYTE_ENCODING_MAGIC => Ok(EncodingWidth::FourByte),
        EIGHT_BYTE_ENCODING_MAGIC => Ok(EncodingWidth::EightByte),
        other => Err(IrError::metadata_corrupted(format!(
            "unknown encoding magic {other:02X?}"
        ))),
    }
}

/// Read and parse the metadata block
pub fn read_metadata<R: Read>(reader: &mut R) -> Result<StreamMetadata> {
    read_metadata_inner(reader).map_err(IrError::into_metadata_corrupted)
}

fn read_metadata_inner<R: Read>(reader: &mut R) -> Result<StreamMetadata> {
    let encoding = read_u8(reader)?;
    if encoding != metadata::ENCODING_JSON {
        return Err(IrError::metadata_corrupted(format!(
            "unknown metadata encoding 0x{encoding:02X}"
        )));
    }

    let len = match read_u8(reader)? {
        metadata::LENGTH_UBYTE => usize::from(read_u8(reader)?),
        metadata::LENGTH_USHORT => usize::from(read_u16(reader)?),
        tag => {
            return Err(IrError::metadata_corrupted(format!(
                "unknown metadata length tag 0x{tag:02X}"
            )));
        }
    };

    let json = read_string(reader, len)?;
    StreamMetadata::from_json(&json)
}
