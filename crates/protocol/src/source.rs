//! Byte-stream source
//!
//! `IrSource` wraps the caller's buffer and hands the decoder a plain
//! `Read + Seek` view of the IR bytes, decompressing on the fly when the
//! buffer is a Zstandard stream.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;
use zstd::stream::read::Decoder;

use crate::tags::ZSTD_FRAME_MAGIC;

/// Readable, seekable view of an IR stream
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use irlog_protocol::{Bytes, IrSource};
///
/// let mut source = IrSource::new(Bytes::from_static(b"\xFD\x2F\xB5\x29")).unwrap();
/// assert!(!source.is_compressed());
///
/// let mut magic = [0u8; 4];
/// source.read_exact(&mut magic).unwrap();
/// assert_eq!(magic, [0xFD, 0x2F, 0xB5, 0x29]);
/// ```
pub enum IrSource {
    /// Uncompressed IR bytes
    Raw(Cursor<Bytes>),
    /// Zstandard-compressed IR bytes
    Zstd(ZstdSource),
}

impl IrSource {
    /// Wrap a buffer, sniffing the Zstandard frame magic
    pub fn new(data: Bytes) -> io::Result<Self> {
        if data.starts_with(&ZSTD_FRAME_MAGIC) {
            Ok(Self::Zstd(ZstdSource::new(data)?))
        } else {
            Ok(Self::Raw(Cursor::new(data)))
        }
    }

    /// Whether reads go through the decompressor
    #[inline]
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Zstd(_))
    }
}

impl Read for IrSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Raw(cursor) => cursor.read(buf),
            Self::Zstd(zstd) => zstd.read(buf),
        }
    }
}

impl Seek for IrSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::Raw(cursor) => cursor.seek(pos),
            Self::Zstd(zstd) => zstd.seek(pos),
        }
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        match self {
            Self::Raw(cursor) => Ok(cursor.position()),
            Self::Zstd(zstd) => Ok(zstd.pos),
        }
    }
}

/// Decompressing reader over a Zstandard buffer
///
/// Positions are offsets into the decompressed stream. Seeking backward
/// restarts decompression from the first frame.
pub struct ZstdSource {
    data: Bytes,
    decoder: Decoder<'static, Cursor<Bytes>>,
    pos: u64,
}

impl ZstdSource {
    fn new(data: Bytes) -> io::Result<Self> {
        let decoder = Decoder::with_buffer(Cursor::new(data.clone()))?;
        Ok(Self {
            data,
            decoder,
            pos: 0,
        })
    }

    fn rewind_decoder(&mut self) -> io::Result<()> {
        self.decoder = Decoder::with_buffer(Cursor::new(self.data.clone()))?;
        self.pos = 0;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> io::Result<()> {
        let skipped = io::copy(&mut self.by_ref().take(n), &mut io::sink())?;
        if skipped < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "seek past end of decompressed stream",
            ));
        }
        Ok(())
    }
}

impl Read for ZstdSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.decoder.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for ZstdSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "seek before start of stream")
            })?,
            SeekFrom::End(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "seek from end of a compressed stream",
                ));
            }
        };

        if target < self.pos {
            self.rewind_decoder()?;
        }
        self.skip(target - self.pos)?;
        Ok(self.pos)
    }
}
