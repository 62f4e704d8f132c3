//! Message rendering
//!
//! Expands logtype templates against their variables and renders structured
//! events as JSON. Both paths finish by inserting the formatted timestamp.

use serde_json::{Map, Number, Value as JsonValue};

use crate::encoded_var::EncodedVariable;
use crate::event::{BufferedLogEvent, EncodedText, EncodedVars, LogEvent, StructuredLogEvent, Value};
use crate::schema::{NodeType, SchemaTree};
use crate::tags::placeholder;
use crate::timestamp::TimestampPattern;
use crate::{IrError, Result};

/// Expand a logtype template, appending the text to `out`
///
/// Placeholders consume encoded and dictionary variables left to right. Every
/// variable must be consumed exactly once.
pub fn expand_logtype<V: EncodedVariable>(
    logtype: &str,
    encoded_vars: &[V],
    dict_vars: &[String],
    out: &mut String,
) -> Result<()> {
    let bytes = logtype.as_bytes();
    let mut encoded = encoded_vars.iter();
    let mut dict = dict_vars.iter();
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            placeholder::INTEGER => {
                out.push_str(&logtype[run_start..i]);
                let var = encoded.next().ok_or_else(|| missing_var("encoded", i))?;
                out.push_str(&var.decode_integer());
                run_start = i + 1;
            }
            placeholder::FLOAT => {
                out.push_str(&logtype[run_start..i]);
                let var = encoded.next().ok_or_else(|| missing_var("encoded", i))?;
                out.push_str(&var.decode_float()?);
                run_start = i + 1;
            }
            placeholder::DICTIONARY => {
                out.push_str(&logtype[run_start..i]);
                let var = dict.next().ok_or_else(|| missing_var("dictionary", i))?;
                out.push_str(var);
                run_start = i + 1;
            }
            placeholder::ESCAPE => {
                if i + 1 >= bytes.len() {
                    return Err(IrError::message_decoding(
                        "logtype ends with an unescaped escape character",
                    ));
                }
                out.push_str(&logtype[run_start..i]);
                // The escaped byte opens the next literal run
                run_start = i + 1;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    out.push_str(&logtype[run_start..]);

    let leftover_encoded = encoded.len();
    let leftover_dict = dict.len();
    if leftover_encoded > 0 || leftover_dict > 0 {
        return Err(IrError::message_decoding(format!(
            "logtype left {leftover_encoded} encoded and {leftover_dict} dictionary variables unused"
        )));
    }
    Ok(())
}

fn missing_var(kind: &str, offset: usize) -> IrError {
    IrError::message_decoding(format!(
        "logtype placeholder at byte {offset} has no {kind} variable left"
    ))
}

impl EncodedText {
    /// Expand into a new string
    pub fn decode(&self) -> Result<String> {
        let mut out = String::with_capacity(self.logtype.len() + 16 * self.encoded_vars.len());
        self.decode_into(&mut out)?;
        Ok(out)
    }

    /// Expand, appending to `out`
    pub fn decode_into(&self, out: &mut String) -> Result<()> {
        match &self.encoded_vars {
            EncodedVars::FourByte(vars) => expand_logtype(&self.logtype, vars, &self.dict_vars, out),
            EncodedVars::EightByte(vars) => {
                expand_logtype(&self.logtype, vars, &self.dict_vars, out)
            }
        }
    }
}

impl StructuredLogEvent {
    /// Build the JSON object described by this event's key paths
    pub fn to_json(&self, schema_tree: &SchemaTree) -> Result<JsonValue> {
        let mut root = Map::new();

        for (node_id, value) in self.pairs() {
            let node = schema_tree.get(*node_id).ok_or_else(|| {
                IrError::message_decoding(format!("event references unknown node id {node_id}"))
            })?;
            let path = schema_tree.key_path(*node_id).unwrap_or_default();
            let Some((leaf, parents)) = path.split_last() else {
                return Err(IrError::message_decoding("event assigns a value to the root"));
            };

            let mut object = &mut root;
            for key in parents {
                let slot = object
                    .entry(key.to_string())
                    .or_insert_with(|| JsonValue::Object(Map::new()));
                object = match slot {
                    JsonValue::Object(map) => map,
                    _ => return Err(key_conflict(&path)),
                };
            }

            match object.get(*leaf) {
                None => {}
                Some(JsonValue::Object(_)) if matches!(value, Value::Empty) => continue,
                Some(_) => return Err(key_conflict(&path)),
            }
            object.insert(leaf.to_string(), value_to_json(value, node.node_type())?);
        }

        Ok(JsonValue::Object(root))
    }
}

fn key_conflict(path: &[&str]) -> IrError {
    IrError::message_decoding(format!("conflicting values for key '{}'", path.join(".")))
}

fn value_to_json(value: &Value, node_type: NodeType) -> Result<JsonValue> {
    Ok(match value {
        Value::Int(v) => JsonValue::Number((*v).into()),
        Value::Float(v) => Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number),
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Str(s) if node_type == NodeType::UnstructuredArray => {
            serde_json::from_str(s).map_err(|e| {
                IrError::message_decoding(format!("unstructured array is not valid JSON: {e}"))
            })?
        }
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::ClpStr(text) if node_type == NodeType::UnstructuredArray => {
            let decoded = text.decode()?;
            serde_json::from_str(&decoded).map_err(|e| {
                IrError::message_decoding(format!("unstructured array is not valid JSON: {e}"))
            })?
        }
        Value::ClpStr(text) => JsonValue::String(text.decode()?),
        Value::Empty => JsonValue::Object(Map::new()),
        Value::Null => JsonValue::Null,
    })
}

/// Render a buffered event's message with its timestamp inserted
pub fn format_log_event(
    event: &BufferedLogEvent,
    schema_tree: &SchemaTree,
    pattern: &TimestampPattern,
) -> Result<String> {
    let mut message = match event.event() {
        LogEvent::Unstructured(unstructured) => unstructured.text.decode()?,
        LogEvent::Structured(structured) => {
            format!(" {}", structured.to_json(schema_tree)?)
        }
    };
    pattern.insert_formatted_timestamp(event.timestamp(), &mut message);
    Ok(message)
}
