//! Test-only IR stream encoder
//!
//! Builds byte streams for tests and benchmarks. It writes exactly the
//! records the decoder understands and panics on inputs it can't encode.
//!
//! # Example
//!
//! ```
//! use irlog_protocol::testing::{IrStreamWriter, INT};
//! use irlog_protocol::{ReaderOptions, StreamReader};
//!
//! let mut writer = IrStreamWriter::unstructured_four_byte(0);
//! writer.push_event(&format!(" INFO took {INT} ms"), &[12], &[], 1_000);
//!
//! let mut reader = StreamReader::create(writer.finish(), ReaderOptions::default()).unwrap();
//! assert_eq!(reader.build().unwrap(), 1);
//! ```

use serde_json::json;

use crate::encoded_var::EncodingWidth;
use crate::event::{EncodedText, EncodedVars, Value};
use crate::schema::{NodeId, NodeType};
use crate::tags::{EIGHT_BYTE_ENCODING_MAGIC, FOUR_BYTE_ENCODING_MAGIC, metadata, payload};

/// Integer placeholder, for building logtypes with `format!`
pub const INT: char = '\u{11}';
/// Dictionary placeholder
pub const DICT: char = '\u{12}';
/// Float placeholder
pub const FLOAT: char = '\u{13}';

/// Timestamp pattern written into generated metadata
pub const TEST_TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S,%3";

/// Incremental IR stream builder
#[derive(Debug, Clone)]
pub struct IrStreamWriter {
    buf: Vec<u8>,
    width: EncodingWidth,
    prev_timestamp: i64,
}

impl IrStreamWriter {
    /// Four-byte unstructured stream with a reference timestamp
    pub fn unstructured_four_byte(reference_timestamp: i64) -> Self {
        let metadata = json!({
            "VERSION": "0.0.2",
            "TIMESTAMP_PATTERN": TEST_TIMESTAMP_PATTERN,
            "TIMESTAMP_PATTERN_SYNTAX": "",
            "TZ_ID": "UTC",
            "REFERENCE_TIMESTAMP": reference_timestamp.to_string(),
        });
        Self::with_metadata(
            FOUR_BYTE_ENCODING_MAGIC,
            &metadata.to_string(),
            reference_timestamp,
        )
    }

    /// Eight-byte unstructured stream
    pub fn unstructured_eight_byte() -> Self {
        let metadata = json!({
            "VERSION": "0.0.2",
            "TIMESTAMP_PATTERN": TEST_TIMESTAMP_PATTERN,
            "TZ_ID": "UTC",
        });
        Self::with_metadata(EIGHT_BYTE_ENCODING_MAGIC, &metadata.to_string(), 0)
    }

    /// Structured stream naming its authoritative keys
    pub fn structured(log_level_key: &str, timestamp_key: &str) -> Self {
        let metadata = json!({
            "VERSION": "0.1.0",
            "LOG_LEVEL_KEY": log_level_key,
            "TIMESTAMP_KEY": timestamp_key,
        });
        Self::with_metadata(FOUR_BYTE_ENCODING_MAGIC, &metadata.to_string(), 0)
    }

    /// Stream with arbitrary magic and metadata JSON
    pub fn with_metadata(magic: [u8; 4], metadata_json: &str, prev_timestamp: i64) -> Self {
        let width = if magic == EIGHT_BYTE_ENCODING_MAGIC {
            EncodingWidth::EightByte
        } else {
            EncodingWidth::FourByte
        };
        let mut writer = Self {
            buf: Vec::with_capacity(256),
            width,
            prev_timestamp,
        };
        writer.buf.extend_from_slice(&magic);
        writer.buf.push(metadata::ENCODING_JSON);
        let len = metadata_json.len();
        if let Ok(len) = u8::try_from(len) {
            writer.buf.push(metadata::LENGTH_UBYTE);
            writer.buf.push(len);
        } else {
            let len = u16::try_from(len).expect("metadata longer than u16::MAX");
            writer.buf.push(metadata::LENGTH_USHORT);
            writer.buf.extend_from_slice(&len.to_be_bytes());
        }
        writer.buf.extend_from_slice(metadata_json.as_bytes());
        writer
    }

    /// Append an unstructured event
    ///
    /// Encoded variables are truncated to `i32` in four-byte streams.
    pub fn push_event(
        &mut self,
        logtype: &str,
        encoded_vars: &[i64],
        dict_vars: &[&str],
        timestamp: i64,
    ) -> &mut Self {
        let vars = match self.width {
            EncodingWidth::FourByte => {
                EncodedVars::FourByte(encoded_vars.iter().map(|v| *v as i32).collect())
            }
            EncodingWidth::EightByte => EncodedVars::EightByte(encoded_vars.to_vec()),
        };
        self.push_encoded_text(&EncodedText {
            logtype: logtype.to_string(),
            encoded_vars: vars,
            dict_vars: dict_vars.iter().map(|s| s.to_string()).collect(),
        });

        match self.width {
            EncodingWidth::EightByte => {
                self.buf.push(payload::TIMESTAMP_VAL);
                self.buf.extend_from_slice(&timestamp.to_be_bytes());
            }
            EncodingWidth::FourByte => self.push_timestamp_delta(timestamp - self.prev_timestamp),
        }
        self.prev_timestamp = timestamp;
        self
    }

    fn push_timestamp_delta(&mut self, delta: i64) {
        if let Ok(d) = i8::try_from(delta) {
            self.buf.push(payload::TIMESTAMP_DELTA_BYTE);
            self.buf.extend_from_slice(&d.to_be_bytes());
        } else if let Ok(d) = i16::try_from(delta) {
            self.buf.push(payload::TIMESTAMP_DELTA_SHORT);
            self.buf.extend_from_slice(&d.to_be_bytes());
        } else if let Ok(d) = i32::try_from(delta) {
            self.buf.push(payload::TIMESTAMP_DELTA_INT);
            self.buf.extend_from_slice(&d.to_be_bytes());
        } else {
            self.buf.push(payload::TIMESTAMP_DELTA_LONG);
            self.buf.extend_from_slice(&delta.to_be_bytes());
        }
    }

    fn push_encoded_text(&mut self, text: &EncodedText) {
        match &text.encoded_vars {
            EncodedVars::FourByte(vars) => {
                for var in vars {
                    self.buf.push(payload::VAR_FOUR_BYTE_ENCODING);
                    self.buf.extend_from_slice(&var.to_be_bytes());
                }
            }
            EncodedVars::EightByte(vars) => {
                for var in vars {
                    self.buf.push(payload::VAR_EIGHT_BYTE_ENCODING);
                    self.buf.extend_from_slice(&var.to_be_bytes());
                }
            }
        }
        for var in &text.dict_vars {
            self.push_sized_string(
                var,
                [
                    payload::VAR_STR_LEN_UBYTE,
                    payload::VAR_STR_LEN_USHORT,
                    payload::VAR_STR_LEN_INT,
                ],
            );
        }
        self.push_sized_string(
            &text.logtype,
            [
                payload::LOGTYPE_STR_LEN_UBYTE,
                payload::LOGTYPE_STR_LEN_USHORT,
                payload::LOGTYPE_STR_LEN_INT,
            ],
        );
    }

    fn push_sized_string(&mut self, s: &str, tags: [u8; 3]) {
        let len = s.len();
        if let Ok(len) = u8::try_from(len) {
            self.buf.push(tags[0]);
            self.buf.push(len);
        } else if let Ok(len) = u16::try_from(len) {
            self.buf.push(tags[1]);
            self.buf.extend_from_slice(&len.to_be_bytes());
        } else {
            let len = u32::try_from(len).expect("string longer than u32::MAX");
            self.buf.push(tags[2]);
            self.buf.extend_from_slice(&len.to_be_bytes());
        }
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Append a UTC-offset change record
    pub fn push_utc_offset_change(&mut self, offset_secs: i64) -> &mut Self {
        self.buf.push(payload::UTC_OFFSET_CHANGE);
        self.buf.extend_from_slice(&offset_secs.to_be_bytes());
        self
    }

    /// Append a schema-tree node insertion
    pub fn push_schema_node(
        &mut self,
        parent_id: NodeId,
        key_name: &str,
        node_type: NodeType,
    ) -> &mut Self {
        self.buf.push(node_type.tag());
        if let Ok(id) = u8::try_from(parent_id) {
            self.buf.push(payload::NODE_PARENT_ID_UBYTE);
            self.buf.push(id);
        } else {
            let id = u16::try_from(parent_id).expect("parent id larger than u16::MAX");
            self.buf.push(payload::NODE_PARENT_ID_USHORT);
            self.buf.extend_from_slice(&id.to_be_bytes());
        }
        self.push_structured_string(key_name);
        self
    }

    /// Append a key-value event; no pairs writes an empty event
    pub fn push_kv_event(&mut self, pairs: &[(NodeId, Value)]) -> &mut Self {
        if pairs.is_empty() {
            self.buf.push(payload::VALUE_EMPTY);
            return self;
        }
        for (id, _) in pairs {
            if let Ok(id) = u8::try_from(*id) {
                self.buf.push(payload::KEY_ID_UBYTE);
                self.buf.push(id);
            } else {
                let id = u16::try_from(*id).expect("key id larger than u16::MAX");
                self.buf.push(payload::KEY_ID_USHORT);
                self.buf.extend_from_slice(&id.to_be_bytes());
            }
        }
        for (_, value) in pairs {
            self.push_value(value);
        }
        self
    }

    fn push_value(&mut self, value: &Value) {
        match value {
            Value::Int(v) => {
                if let Ok(v) = i8::try_from(*v) {
                    self.buf.push(payload::VALUE_INT8);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                } else if let Ok(v) = i16::try_from(*v) {
                    self.buf.push(payload::VALUE_INT16);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                } else if let Ok(v) = i32::try_from(*v) {
                    self.buf.push(payload::VALUE_INT32);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                } else {
                    self.buf.push(payload::VALUE_INT64);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                }
            }
            Value::Float(v) => {
                self.buf.push(payload::VALUE_FLOAT);
                self.buf.extend_from_slice(&v.to_bits().to_be_bytes());
            }
            Value::Bool(true) => self.buf.push(payload::VALUE_TRUE),
            Value::Bool(false) => self.buf.push(payload::VALUE_FALSE),
            Value::Str(s) => self.push_structured_string(s),
            Value::ClpStr(text) => {
                self.buf.push(payload::VALUE_FOUR_BYTE_CLP_STR);
                self.push_encoded_text(text);
            }
            Value::Empty => self.buf.push(payload::VALUE_EMPTY),
            Value::Null => self.buf.push(payload::VALUE_NULL),
        }
    }

    fn push_structured_string(&mut self, s: &str) {
        self.push_sized_string(
            s,
            [
                payload::STR_LEN_UBYTE,
                payload::STR_LEN_USHORT,
                payload::STR_LEN_UINT,
            ],
        );
    }

    /// Append raw bytes
    pub fn push_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append the end-of-stream record
    pub fn end_of_stream(&mut self) -> &mut Self {
        self.buf.push(payload::END_OF_STREAM);
        self
    }

    /// Bytes written so far
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Bytes written so far, Zstandard-compressed
    pub fn compressed(&self) -> Vec<u8> {
        zstd::encode_all(self.buf.as_slice(), 3).expect("in-memory zstd compression")
    }
}

/// Build a four-byte CLP string value
pub fn four_byte_text(logtype: &str, encoded_vars: &[i32], dict_vars: &[&str]) -> EncodedText {
    EncodedText {
        logtype: logtype.to_string(),
        encoded_vars: EncodedVars::FourByte(encoded_vars.to_vec()),
        dict_vars: dict_vars.iter().map(|s| s.to_string()).collect(),
    }
}

struct FloatDigits {
    negative: bool,
    digits: u64,
    num_digits: u64,
    decimal_pos: u64,
}

fn split_float(text: &str) -> FloatDigits {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .expect("float text needs a decimal point");
    assert!(!frac_part.is_empty(), "float text needs digits after the point");

    let all_digits = format!("{int_part}{frac_part}");
    assert!(all_digits.bytes().all(|b| b.is_ascii_digit()), "float text must be decimal");
    FloatDigits {
        negative,
        digits: all_digits.parse().expect("float digits fit in u64"),
        num_digits: all_digits.len() as u64,
        decimal_pos: frac_part.len() as u64,
    }
}

/// Encode decimal text like `"-3.14"` as a four-byte float variable
pub fn encode_four_byte_float(text: &str) -> i32 {
    let f = split_float(text);
    assert!(f.num_digits <= 8 && f.digits < (1 << 25), "too many digits for four-byte float");
    let bits = (u32::from(f.negative) << 31)
        | ((f.digits as u32) << 6)
        | (((f.num_digits - 1) as u32) << 3)
        | ((f.decimal_pos - 1) as u32);
    bits as i32
}

/// Encode decimal text as an eight-byte float variable
pub fn encode_eight_byte_float(text: &str) -> i64 {
    let f = split_float(text);
    assert!(f.num_digits <= 16 && f.digits < (1 << 54), "too many digits for eight-byte float");
    let bits = (u64::from(f.negative) << 63)
        | (f.digits << 8)
        | ((f.num_digits - 1) << 4)
        | (f.decimal_pos - 1);
    bits as i64
}
