//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! little-endian values from a byte slice without copying, plus a set of
//! positional `*_at` accessors that never fail loudly: a read that would
//! leave the buffer simply yields `None`.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Check whether `length` bytes can be read at `offset`.
///
/// A read is valid only if `offset >= 0 && offset <= data.len() - length`.
/// Offsets are taken as `i64` because pointer arithmetic on the formats this
/// crate serves routinely produces negative values from corrupt data.
#[inline]
pub fn can_read(data: &[u8], offset: i64, length: usize) -> bool {
    offset >= 0
        && data.len() >= length
        && (offset as u64) <= (data.len() - length) as u64
}

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// # Example
///
/// ```
/// use livingtool_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.u16_at(6), Some(0x0807));
/// assert_eq!(reader.u32_at(6), None);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// The whole underlying buffer.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Read a null-terminated string of at most `max_len` bytes.
    ///
    /// The terminator is consumed when it is found within `max_len` bytes.
    /// Bytes outside the ASCII range are replaced with `?`.
    pub fn read_cstring_bounded(&mut self, max_len: usize) -> Result<String> {
        let mut text = String::new();
        for _ in 0..max_len {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            text.push(if b.is_ascii() { b as char } else { '?' });
        }
        Ok(text)
    }

    /// Skip every consecutive occurrence of `value` at the cursor.
    pub fn skip_run(&mut self, value: u8) {
        let run = self
            .remaining_bytes()
            .iter()
            .take_while(|&&b| b == value)
            .count();
        self.position += run;
    }

    /// Bytes at an absolute offset, if the whole range is inside the buffer.
    #[inline]
    pub fn bytes_at(&self, offset: i64, length: usize) -> Option<&'a [u8]> {
        if !can_read(self.data, offset, length) {
            return None;
        }
        let start = offset as usize;
        Some(&self.data[start..start + length])
    }

    /// Little-endian u16 at an absolute offset.
    #[inline]
    pub fn u16_at(&self, offset: i64) -> Option<u16> {
        self.bytes_at(offset, 2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
    }

    /// Little-endian u32 at an absolute offset.
    #[inline]
    pub fn u32_at(&self, offset: i64) -> Option<u32> {
        self.bytes_at(offset, 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Little-endian i32 at an absolute offset.
    #[inline]
    pub fn i32_at(&self, offset: i64) -> Option<i32> {
        self.u32_at(offset).map(|v| v as i32)
    }

    /// Read a zerocopy struct at an absolute offset.
    #[inline]
    pub fn struct_at<T: FromBytes>(&self, offset: i64) -> Option<T> {
        self.bytes_at(offset, std::mem::size_of::<T>())
            .and_then(|bytes| T::read_from_bytes(bytes).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // i32: -1
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.i32_at(4), Some(-1));
        reader.seek(8);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_can_read_bounds() {
        let data = [0u8; 8];
        assert!(can_read(&data, 0, 8));
        assert!(can_read(&data, 4, 4));
        assert!(can_read(&data, 8, 0));
        assert!(!can_read(&data, 5, 4));
        assert!(!can_read(&data, -1, 1));
        assert!(!can_read(&data, 0, 9));
        assert!(!can_read(&[], 0, 1));
    }

    #[test]
    fn test_positional_reads_do_not_move_cursor() {
        let data = [0x34, 0x12, 0x78, 0x56];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.u16_at(0), Some(0x1234));
        assert_eq!(reader.u32_at(0), Some(0x56781234));
        assert_eq!(reader.u16_at(3), None);
        assert_eq!(reader.u16_at(-2), None);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_cstring_bounded() {
        let data = b"SLIME\0\0\0\x05\x00BITE\0";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstring_bounded(32).unwrap(), "SLIME");
        reader.skip_run(0);
        assert_eq!(reader.read_u16().unwrap(), 5);
        assert_eq!(reader.read_cstring_bounded(32).unwrap(), "BITE");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_cstring_bounded_stops_at_limit() {
        let data = b"ABCDEFGH";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstring_bounded(4).unwrap(), "ABCD");
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
    }
}
