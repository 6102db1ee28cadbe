use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

use crate::error::ParseError;

/// Sequential reader over an in-memory block file.
///
/// Every read either consumes exactly the requested number of bytes or fails
/// with [`ParseError::TruncatedStream`] leaving the position untouched.
#[derive(Debug, Clone)]
pub struct Cursor {
    data: Bytes,
    pos: usize,
}

impl Cursor {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into(), pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the read position. Seeking past the end clamps to the end.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, n: usize) -> Result<(), ParseError> {
        if n > self.remaining() {
            return Err(ParseError::TruncatedStream {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Consumes `n` bytes as a zero-copy slice of the underlying buffer.
    pub fn read(&mut self, n: usize) -> Result<Bytes, ParseError> {
        self.ensure(n)?;
        let out = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Consumes `N` bytes and returns them in reverse order (wire little-endian to natural).
    pub fn read_reversed<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let mut out = self.read_array::<N>()?;
        out.reverse();
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, ParseError> {
        self.ensure(1)?;
        Ok(self.data[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ParseError> {
        Ok(LittleEndian::read_u16(&self.read_array::<2>()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ParseError> {
        Ok(LittleEndian::read_u32(&self.read_array::<4>()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, ParseError> {
        Ok(LittleEndian::read_i32(&self.read_array::<4>()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, ParseError> {
        Ok(LittleEndian::read_u64(&self.read_array::<8>()?))
    }
}
