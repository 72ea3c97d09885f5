//! Primitive encoding/decoding for the schematic binary format.
//!
//! Implements varints, little-endian fixed-width integers and
//! length-prefixed strings and byte arrays.

use crate::error::DecodeError;
use crate::limits::MAX_VARINT_BYTES;

// =============================================================================
// DECODING
// =============================================================================

/// Cursor over an encoded schematic.
///
/// Every read is bounds-checked; running out of input is reported as
/// [`DecodeError::UnexpectedEof`] naming the field being read.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Unread input.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Number of unread bytes. Also an upper bound for any count read next,
    /// since every counted item takes at least one byte.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads exactly N bytes into an array.
    #[inline]
    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, context)?);
        Ok(out)
    }

    /// Reads a little-endian u16.
    pub fn read_u16(&mut self, context: &'static str) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a little-endian u32.
    pub fn read_u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a little-endian i32.
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array(context)?))
    }

    /// Reads an unsigned varint (LEB128) of at most five bytes.
    ///
    /// A sixth continuation byte is reported as [`DecodeError::VarintTooLong`];
    /// the result therefore never exceeds 35 bits.
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;

        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            result |= ((byte & 0x7F) as u64) << (7 * i);

            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }

        Err(DecodeError::VarintTooLong { context })
    }

    /// Reads a varint used as a count or length, bounded by `max`.
    pub fn read_len(&mut self, max: usize, field: &'static str) -> Result<usize, DecodeError> {
        let len = self.read_varint(field)?;
        if len > max as u64 {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len: len as usize,
                max,
            });
        }
        Ok(len as usize)
    }

    /// Reads a length-prefixed UTF-8 string.
    #[inline]
    pub fn read_str(&mut self, max_len: usize, field: &'static str) -> Result<&'a str, DecodeError> {
        let len = self.read_len(max_len, field)?;
        let bytes = self.read_bytes(len, field)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field })
    }

    /// Reads a length-prefixed byte array.
    pub fn read_bytes_prefixed(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        let len = self.read_len(max_len, field)?;
        self.read_bytes(len, field)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Growable output buffer for encoding.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an unsigned varint (LEB128).
    ///
    /// Values below 2^35 take at most five bytes, which is all a reader
    /// accepts; the encoder never writes anything larger.
    #[inline]
    pub fn write_varint(&mut self, mut value: u64) {
        // Ten 7-bit groups cover any u64
        let mut buf = [0u8; 10];
        let mut len = 0;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Writes a length-prefixed byte array.
    pub fn write_bytes_prefixed(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }
}

/// Encodes a sequence of values as back-to-back varints.
pub fn to_varint_bytes<I>(values: I) -> Vec<u8>
where
    I: IntoIterator<Item = u64>,
{
    let mut writer = Writer::new();
    for value in values {
        writer.write_varint(value);
    }
    writer.into_bytes()
}
