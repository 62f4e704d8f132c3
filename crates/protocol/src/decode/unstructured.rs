//! Unstructured record deserialization
//!
//! An event is its variables, then its logtype, then its timestamp. Four-byte
//! streams store timestamps as deltas from the previous event, starting at the
//! metadata's reference timestamp; eight-byte streams store them absolute.

use std::io::Read;

use super::IrUnit;
use super::preamble::Preamble;
use super::primitives::{
    checked_len, read_i8, read_i16, read_i32, read_i64, read_string, read_u8, read_u16,
    try_read_tag,
};
use crate::encoded_var::EncodingWidth;
use crate::event::{BufferedLogEvent, EncodedText, EncodedVars, LogEvent, UnstructuredLogEvent};
use crate::level::LogLevel;
use crate::tags::{metadata, payload};
use crate::{IrError, Result};

#[derive(Debug)]
pub(crate) struct UnstructuredDeserializer {
    width: EncodingWidth,
    prev_timestamp: i64,
}

impl UnstructuredDeserializer {
    pub(crate) fn new(preamble: &Preamble) -> Result<Self> {
        let prev_timestamp = match (preamble.width, preamble.metadata.reference_timestamp) {
            (EncodingWidth::FourByte, None) => {
                return Err(IrError::metadata_corrupted(format!(
                    "four-byte stream has no {}",
                    metadata::REFERENCE_TIMESTAMP_KEY
                )));
            }
            (_, reference) => reference.unwrap_or(0),
        };
        Ok(Self {
            width: preamble.width,
            prev_timestamp,
        })
    }

    pub(crate) fn deserialize_next<R: Read>(&mut self, reader: &mut R) -> Result<IrUnit> {
        let tag = match try_read_tag(reader)? {
            None | Some(payload::END_OF_STREAM) => return Ok(IrUnit::EndOfStream),
            Some(payload::UTC_OFFSET_CHANGE) => {
                return Ok(IrUnit::UtcOffsetChange(read_i64(reader)?));
            }
            Some(tag) => tag,
        };

        let text = read_encoded_text(reader, tag, self.width)?;
        let timestamp = self.read_timestamp(reader)?;

        let level = text
            .decode()
            .map(|message| LogLevel::from_message_prefix(&message))
            .unwrap_or_default();

        let event = LogEvent::Unstructured(UnstructuredLogEvent { text, timestamp });
        Ok(IrUnit::LogEvent(BufferedLogEvent::new(event, level, timestamp)))
    }

    fn read_timestamp<R: Read>(&mut self, reader: &mut R) -> Result<i64> {
        let tag = read_u8(reader)?;
        let timestamp = match (self.width, tag) {
            (EncodingWidth::EightByte, payload::TIMESTAMP_VAL) => read_i64(reader)?,
            (EncodingWidth::FourByte, payload::TIMESTAMP_DELTA_BYTE) => {
                self.apply_delta(i64::from(read_i8(reader)?))?
            }
            (EncodingWidth::FourByte, payload::TIMESTAMP_DELTA_SHORT) => {
                self.apply_delta(i64::from(read_i16(reader)?))?
            }
            (EncodingWidth::FourByte, payload::TIMESTAMP_DELTA_INT) => {
                self.apply_delta(i64::from(read_i32(reader)?))?
            }
            (EncodingWidth::FourByte, payload::TIMESTAMP_DELTA_LONG) => {
                self.apply_delta(read_i64(reader)?)?
            }
            (width, tag) => {
                return Err(IrError::corrupt_stream(format!(
                    "unexpected timestamp tag 0x{tag:02X} in {width} stream"
                )));
            }
        };
        self.prev_timestamp = timestamp;
        Ok(timestamp)
    }

    fn apply_delta(&self, delta: i64) -> Result<i64> {
        self.prev_timestamp
            .checked_add(delta)
            .ok_or_else(|| IrError::corrupt_stream("timestamp delta overflows"))
    }
}

/// Read variables and logtype, starting from an already-read tag
///
/// Used for unstructured events and for CLP-encoded string values.
pub(crate) fn read_encoded_text<R: Read>(
    reader: &mut R,
    first_tag: u8,
    width: EncodingWidth,
) -> Result<EncodedText> {
    let mut four_byte = Vec::new();
    let mut eight_byte = Vec::new();
    let mut dict_vars = Vec::new();
    let mut tag = first_tag;

    let logtype = loop {
        match tag {
            payload::VAR_FOUR_BYTE_ENCODING if width == EncodingWidth::FourByte => {
                four_byte.push(read_i32(reader)?);
            }
            payload::VAR_EIGHT_BYTE_ENCODING if width == EncodingWidth::EightByte => {
                eight_byte.push(read_i64(reader)?);
            }
            payload::VAR_STR_LEN_UBYTE => {
                let len = usize::from(read_u8(reader)?);
                dict_vars.push(read_string(reader, len)?);
            }
            payload::VAR_STR_LEN_USHORT => {
                let len = usize::from(read_u16(reader)?);
                dict_vars.push(read_string(reader, len)?);
            }
            payload::VAR_STR_LEN_INT => {
                let len = checked_len(i64::from(read_i32(reader)?))?;
                dict_vars.push(read_string(reader, len)?);
            }
            payload::LOGTYPE_STR_LEN_UBYTE => {
                let len = usize::from(read_u8(reader)?);
                break read_string(reader, len)?;
            }
            payload::LOGTYPE_STR_LEN_USHORT => {
                let len = usize::from(read_u16(reader)?);
                break read_string(reader, len)?;
            }
            payload::LOGTYPE_STR_LEN_INT => {
                let len = checked_len(i64::from(read_i32(reader)?))?;
                break read_string(reader, len)?;
            }
            other => {
                return Err(IrError::corrupt_stream(format!(
                    "unexpected tag 0x{other:02X} in {width} event"
                )));
            }
        }
        tag = read_u8(reader)?;
    };

    let encoded_vars = match width {
        EncodingWidth::FourByte => EncodedVars::FourByte(four_byte),
        EncodingWidth::EightByte => EncodedVars::EightByte(eight_byte),
    };
    Ok(EncodedText {
        logtype,
        encoded_vars,
        dict_vars,
    })
}
