//! IR wire-format constants
//!
//! Tag bytes, magic numbers and metadata keys of the IR stream protocol.
//! Multi-byte integers that follow a tag are big-endian.
//!
//! # Stream Layout
//!
//! ```text
//! [encoding magic: 4 bytes]
//! [metadata encoding tag][metadata length tag][length][metadata JSON]
//! [record]*
//! [end-of-stream tag]      (optional: physical end of input also ends the stream)
//! ```

/// Encoding-type magic for four-byte encoded variables
pub const FOUR_BYTE_ENCODING_MAGIC: [u8; 4] = [0xFD, 0x2F, 0xB5, 0x29];

/// Encoding-type magic for eight-byte encoded variables
pub const EIGHT_BYTE_ENCODING_MAGIC: [u8; 4] = [0xFD, 0x2F, 0xB5, 0x30];

/// Zstandard frame magic, as it appears at the start of a compressed input
pub const ZSTD_FRAME_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Versions decoded as unstructured (logtype + variables) streams
pub const UNSTRUCTURED_VERSIONS: &[&str] = &["v0.0.0", "0.0.1", "0.0.2"];

/// Versions decoded as structured (key-value) streams
pub const STRUCTURED_VERSIONS: &[&str] = &["0.1.0"];

/// Metadata block tags and keys
pub mod metadata {
    /// Metadata is a JSON document
    pub const ENCODING_JSON: u8 = 0x01;
    /// Metadata length follows as u8
    pub const LENGTH_UBYTE: u8 = 0x11;
    /// Metadata length follows as u16
    pub const LENGTH_USHORT: u8 = 0x12;

    pub const VERSION_KEY: &str = "VERSION";
    pub const TIMESTAMP_PATTERN_KEY: &str = "TIMESTAMP_PATTERN";
    pub const TIMESTAMP_PATTERN_SYNTAX_KEY: &str = "TIMESTAMP_PATTERN_SYNTAX";
    pub const TZ_ID_KEY: &str = "TZ_ID";
    pub const REFERENCE_TIMESTAMP_KEY: &str = "REFERENCE_TIMESTAMP";
    pub const LOG_LEVEL_KEY: &str = "LOG_LEVEL_KEY";
    pub const TIMESTAMP_KEY: &str = "TIMESTAMP_KEY";
}

/// Record tags
pub mod payload {
    pub const END_OF_STREAM: u8 = 0x00;
    pub const UTC_OFFSET_CHANGE: u8 = 0x3F;

    // Unstructured event parts
    pub const VAR_FOUR_BYTE_ENCODING: u8 = 0x18;
    pub const VAR_EIGHT_BYTE_ENCODING: u8 = 0x19;
    pub const VAR_STR_LEN_UBYTE: u8 = 0x11;
    pub const VAR_STR_LEN_USHORT: u8 = 0x12;
    pub const VAR_STR_LEN_INT: u8 = 0x13;
    pub const LOGTYPE_STR_LEN_UBYTE: u8 = 0x21;
    pub const LOGTYPE_STR_LEN_USHORT: u8 = 0x22;
    pub const LOGTYPE_STR_LEN_INT: u8 = 0x23;
    pub const TIMESTAMP_VAL: u8 = 0x30;
    pub const TIMESTAMP_DELTA_BYTE: u8 = 0x31;
    pub const TIMESTAMP_DELTA_SHORT: u8 = 0x32;
    pub const TIMESTAMP_DELTA_INT: u8 = 0x33;
    pub const TIMESTAMP_DELTA_LONG: u8 = 0x34;

    // Structured strings (key names and string values)
    pub const STR_LEN_UBYTE: u8 = 0x41;
    pub const STR_LEN_USHORT: u8 = 0x42;
    pub const STR_LEN_UINT: u8 = 0x43;

    // Structured values
    pub const VALUE_INT8: u8 = 0x51;
    pub const VALUE_INT16: u8 = 0x52;
    pub const VALUE_INT32: u8 = 0x53;
    pub const VALUE_INT64: u8 = 0x54;
    pub const VALUE_FLOAT: u8 = 0x56;
    pub const VALUE_TRUE: u8 = 0x57;
    pub const VALUE_FALSE: u8 = 0x58;
    pub const VALUE_FOUR_BYTE_CLP_STR: u8 = 0x59;
    pub const VALUE_EMPTY: u8 = 0x5E;
    pub const VALUE_NULL: u8 = 0x5F;

    // Schema-tree node insertion
    pub const NODE_PARENT_ID_UBYTE: u8 = 0x60;
    pub const NODE_PARENT_ID_USHORT: u8 = 0x61;
    pub const NODE_INT: u8 = 0x71;
    pub const NODE_FLOAT: u8 = 0x72;
    pub const NODE_BOOL: u8 = 0x73;
    pub const NODE_STR: u8 = 0x74;
    pub const NODE_UNSTRUCTURED_ARRAY: u8 = 0x75;
    pub const NODE_OBJ: u8 = 0x76;

    // Key ids opening a key-value event
    pub const KEY_ID_UBYTE: u8 = 0x65;
    pub const KEY_ID_USHORT: u8 = 0x66;
}

/// Placeholder bytes inside a logtype
pub mod placeholder {
    pub const INTEGER: u8 = 0x11;
    pub const DICTIONARY: u8 = 0x12;
    pub const FLOAT: u8 = 0x13;
    /// Makes the following byte literal
    pub const ESCAPE: u8 = b'\\';
}
