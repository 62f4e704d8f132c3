//! Big-endian read helpers over a byte source

use std::io::{self, Read};

use crate::{IrError, Result};

/// Read one tag byte, or `None` at a clean end of input
pub(crate) fn try_read_tag<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

#[inline]
pub(crate) fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

#[inline]
pub(crate) fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    Ok(read_array::<R, 1>(reader)?[0])
}

#[inline]
pub(crate) fn read_i8<R: Read>(reader: &mut R) -> Result<i8> {
    Ok(i8::from_be_bytes(read_array(reader)?))
}

#[inline]
pub(crate) fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    Ok(u16::from_be_bytes(read_array(reader)?))
}

#[inline]
pub(crate) fn read_i16<R: Read>(reader: &mut R) -> Result<i16> {
    Ok(i16::from_be_bytes(read_array(reader)?))
}

#[inline]
pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(u32::from_be_bytes(read_array(reader)?))
}

#[inline]
pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    Ok(i32::from_be_bytes(read_array(reader)?))
}

#[inline]
pub(crate) fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    Ok(u64::from_be_bytes(read_array(reader)?))
}

#[inline]
pub(crate) fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    Ok(i64::from_be_bytes(read_array(reader)?))
}

/// Read a UTF-8 string of exactly `len` bytes
pub(crate) fn read_string<R: Read>(reader: &mut R, len: usize) -> Result<String> {
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    let n = reader.take(len as u64).read_to_end(&mut buf)?;
    if n < len {
        return Err(IrError::TruncatedStream);
    }
    String::from_utf8(buf).map_err(|e| IrError::corrupt_stream(format!("string is not UTF-8: {e}")))
}

/// Convert a signed wire length, rejecting negatives
pub(crate) fn checked_len(len: i64) -> Result<usize> {
    usize::try_from(len).map_err(|_| IrError::corrupt_stream(format!("negative length {len}")))
}
