//! Structured (key-value) record deserialization
//!
//! Node-insertion records grow the schema tree. Event records list key ids,
//! then one value per key id. The nodes carrying the authoritative log level
//! and timestamp are found once, at insertion time, by key name.

use std::collections::HashSet;
use std::io::Read;

use super::IrUnit;
use super::primitives::{
    read_i8, read_i16, read_i32, read_i64, read_string, read_u8, read_u16, read_u32, read_u64,
    try_read_tag,
};
use super::unstructured::read_encoded_text;
use crate::encoded_var::EncodingWidth;
use crate::event::{BufferedLogEvent, LogEvent, StructuredLogEvent, Value};
use crate::level::LogLevel;
use crate::schema::{NodeId, NodeLocator, NodeType, ROOT_NODE_ID, SchemaTree};
use crate::tags::payload;
use crate::{IrError, Result};

/// Key names of the authoritative fields and their resolved node ids
#[derive(Debug, Default)]
pub(crate) struct AuthoritativeKeys {
    log_level_key: Option<String>,
    timestamp_key: Option<String>,
    log_level_node: Option<NodeId>,
    timestamp_node: Option<NodeId>,
}

impl AuthoritativeKeys {
    pub(crate) fn new(log_level_key: Option<String>, timestamp_key: Option<String>) -> Self {
        Self {
            log_level_key,
            timestamp_key,
            log_level_node: None,
            timestamp_node: None,
        }
    }

    /// Record a newly inserted node; the first match for each key wins
    pub(crate) fn observe(&mut self, id: NodeId, key_name: &str) {
        if self.log_level_node.is_none() && self.log_level_key.as_deref() == Some(key_name) {
            self.log_level_node = Some(id);
        }
        if self.timestamp_node.is_none() && self.timestamp_key.as_deref() == Some(key_name) {
            self.timestamp_node = Some(id);
        }
    }

    pub(crate) fn log_level_node(&self) -> Option<NodeId> {
        self.log_level_node
    }

    pub(crate) fn timestamp_node(&self) -> Option<NodeId> {
        self.timestamp_node
    }
}

#[derive(Debug)]
pub(crate) struct StructuredDeserializer {
    keys: AuthoritativeKeys,
}

impl StructuredDeserializer {
    pub(crate) fn new(keys: AuthoritativeKeys) -> Self {
        Self { keys }
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &AuthoritativeKeys {
        &self.keys
    }

    pub(crate) fn deserialize_next<R: Read>(
        &mut self,
        reader: &mut R,
        schema_tree: &mut SchemaTree,
    ) -> Result<IrUnit> {
        let tag = match try_read_tag(reader)? {
            None | Some(payload::END_OF_STREAM) => return Ok(IrUnit::EndOfStream),
            Some(tag) => tag,
        };

        if let Some(node_type) = NodeType::from_tag(tag) {
            return self.insert_node(reader, node_type, schema_tree);
        }

        let pairs = match tag {
            payload::UTC_OFFSET_CHANGE => return Ok(IrUnit::UtcOffsetChange(read_i64(reader)?)),
            payload::VALUE_EMPTY => Vec::new(),
            payload::KEY_ID_UBYTE | payload::KEY_ID_USHORT => {
                read_kv_pairs(reader, tag, schema_tree)?
            }
            other => {
                return Err(IrError::corrupt_stream(format!(
                    "unexpected record tag 0x{other:02X}"
                )));
            }
        };

        let event = StructuredLogEvent::new(pairs);
        let level = self
            .keys
            .log_level_node()
            .and_then(|id| event.get(id))
            .map(level_from_value)
            .unwrap_or_default();
        let timestamp = match self.keys.timestamp_node().and_then(|id| event.get(id)) {
            Some(Value::Int(ts)) => *ts,
            _ => 0,
        };

        Ok(IrUnit::LogEvent(BufferedLogEvent::new(
            LogEvent::Structured(event),
            level,
            timestamp,
        )))
    }

    fn insert_node<R: Read>(
        &mut self,
        reader: &mut R,
        node_type: NodeType,
        schema_tree: &mut SchemaTree,
    ) -> Result<IrUnit> {
        let parent_id = match read_u8(reader)? {
            payload::NODE_PARENT_ID_UBYTE => NodeId::from(read_u8(reader)?),
            payload::NODE_PARENT_ID_USHORT => NodeId::from(read_u16(reader)?),
            other => {
                return Err(IrError::corrupt_stream(format!(
                    "unexpected parent id tag 0x{other:02X}"
                )));
            }
        };

        let tag = read_u8(reader)?;
        let key_name = read_key_string(reader, tag)?.ok_or_else(|| {
            IrError::corrupt_stream(format!("unexpected key name tag 0x{tag:02X}"))
        })?;

        let id = schema_tree.insert_node(NodeLocator::new(parent_id, key_name.clone(), node_type))?;
        self.keys.observe(id, &key_name);
        Ok(IrUnit::SchemaTreeNodeInsertion(id))
    }
}

fn read_key_string<R: Read>(reader: &mut R, tag: u8) -> Result<Option<String>> {
    let len = match tag {
        payload::STR_LEN_UBYTE => usize::from(read_u8(reader)?),
        payload::STR_LEN_USHORT => usize::from(read_u16(reader)?),
        payload::STR_LEN_UINT => read_u32(reader)? as usize,
        _ => return Ok(None),
    };
    read_string(reader, len).map(Some)
}

fn read_kv_pairs<R: Read>(
    reader: &mut R,
    first_tag: u8,
    schema_tree: &SchemaTree,
) -> Result<Vec<(NodeId, Value)>> {
    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    let mut tag = first_tag;

    loop {
        let id = match tag {
            payload::KEY_ID_UBYTE => NodeId::from(read_u8(reader)?),
            payload::KEY_ID_USHORT => NodeId::from(read_u16(reader)?),
            _ => break,
        };
        if id == ROOT_NODE_ID || schema_tree.get(id).is_none() {
            return Err(IrError::corrupt_stream(format!("event uses unknown key id {id}")));
        }
        if !seen.insert(id) {
            return Err(IrError::corrupt_stream(format!("event repeats key id {id}")));
        }
        ids.push(id);
        tag = read_u8(reader)?;
    }

    let mut pairs = Vec::with_capacity(ids.len());
    for (idx, id) in ids.iter().copied().enumerate() {
        if idx > 0 {
            tag = read_u8(reader)?;
        }
        let value = read_value(reader, tag)?;

        let node_type = schema_tree
            .get(id)
            .map(|node| node.node_type())
            .ok_or_else(|| IrError::corrupt_stream(format!("event uses unknown key id {id}")))?;
        if !is_compatible(node_type, &value) {
            return Err(IrError::corrupt_stream(format!(
                "{} value for {} node {id}",
                value.kind(),
                node_type
            )));
        }
        pairs.push((id, value));
    }
    Ok(pairs)
}

fn read_value<R: Read>(reader: &mut R, tag: u8) -> Result<Value> {
    let value = match tag {
        payload::VALUE_INT8 => Value::Int(i64::from(read_i8(reader)?)),
        payload::VALUE_INT16 => Value::Int(i64::from(read_i16(reader)?)),
        payload::VALUE_INT32 => Value::Int(i64::from(read_i32(reader)?)),
        payload::VALUE_INT64 => Value::Int(read_i64(reader)?),
        payload::VALUE_FLOAT => Value::Float(f64::from_bits(read_u64(reader)?)),
        payload::VALUE_TRUE => Value::Bool(true),
        payload::VALUE_FALSE => Value::Bool(false),
        payload::VALUE_FOUR_BYTE_CLP_STR => {
            let first = read_u8(reader)?;
            Value::ClpStr(read_encoded_text(reader, first, EncodingWidth::FourByte)?)
        }
        payload::VALUE_EMPTY => Value::Empty,
        payload::VALUE_NULL => Value::Null,
        other => match read_key_string(reader, other)? {
            Some(s) => Value::Str(s),
            None => {
                return Err(IrError::corrupt_stream(format!(
                    "unexpected value tag 0x{other:02X}"
                )));
            }
        },
    };
    Ok(value)
}

fn is_compatible(node_type: NodeType, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Int(_) => node_type == NodeType::Int,
        Value::Float(_) => node_type == NodeType::Float,
        Value::Bool(_) => node_type == NodeType::Bool,
        Value::Str(_) | Value::ClpStr(_) => {
            matches!(node_type, NodeType::Str | NodeType::UnstructuredArray)
        }
        Value::Empty => node_type == NodeType::Obj,
    }
}

/// Resolve a log level from the authoritative level value
pub(crate) fn level_from_value(value: &Value) -> LogLevel {
    match value {
        Value::Str(name) => LogLevel::from_name(name),
        Value::ClpStr(text) => text
            .decode()
            .map(|name| LogLevel::from_name(&name))
            .unwrap_or_default(),
        Value::Int(n) => u8::try_from(*n).map(LogLevel::from_u8).unwrap_or_default(),
        _ => LogLevel::None,
    }
}
