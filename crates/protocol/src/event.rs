//! Log event types
//!
//! Deserialized events are immutable. The buffer stores each one beside its
//! resolved level and timestamp so that filtering never re-decodes text.

use serde::Serialize;

use crate::level::LogLevel;
use crate::schema::NodeId;

/// Encoded variables of one message, at the stream's width
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedVars {
    FourByte(Vec<i32>),
    EightByte(Vec<i64>),
}

impl EncodedVars {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::FourByte(vars) => vars.len(),
            Self::EightByte(vars) => vars.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A CLP-encoded message: logtype template plus its variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub logtype: String,
    pub encoded_vars: EncodedVars,
    pub dict_vars: Vec<String>,
}

/// Unstructured event: encoded message and absolute timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnstructuredLogEvent {
    pub text: EncodedText,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// A typed value in a structured event
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Four-byte CLP-encoded string
    ClpStr(EncodedText),
    /// Empty object
    Empty,
    Null,
}

impl Value {
    /// Get the name of the value's kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Str(_) => "str",
            Self::ClpStr(_) => "clp_str",
            Self::Empty => "empty",
            Self::Null => "null",
        }
    }
}

/// Structured event: values keyed by schema-tree node id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredLogEvent {
    pairs: Vec<(NodeId, Value)>,
}

impl StructuredLogEvent {
    pub fn new(pairs: Vec<(NodeId, Value)>) -> Self {
        Self { pairs }
    }

    /// Key-value pairs in stream order
    #[inline]
    pub fn pairs(&self) -> &[(NodeId, Value)] {
        &self.pairs
    }

    /// Value stored at a node, if present
    pub fn get(&self, node_id: NodeId) -> Option<&Value> {
        self.pairs
            .iter()
            .find(|(id, _)| *id == node_id)
            .map(|(_, value)| value)
    }
}

/// One deserialized event of either kind
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Unstructured(UnstructuredLogEvent),
    Structured(StructuredLogEvent),
}

/// A buffered event with its level and timestamp resolved
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedLogEvent {
    event: LogEvent,
    level: LogLevel,
    timestamp: i64,
}

impl BufferedLogEvent {
    pub fn new(event: LogEvent, level: LogLevel, timestamp: i64) -> Self {
        Self {
            event,
            level,
            timestamp,
        }
    }

    #[inline]
    pub fn event(&self) -> &LogEvent {
        &self.event
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Epoch milliseconds
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// A rendered event returned by range decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedLogEvent {
    /// Message text with the formatted timestamp inserted
    pub message: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub level: LogLevel,
    /// 1-based position in the unfiltered buffer
    pub event_num: usize,
}
