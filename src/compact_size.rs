use bytes::Bytes;

use crate::cursor::Cursor;
use crate::error::ParseError;

/// A decoded compact-size integer together with the exact bytes it was read from.
///
/// The raw bytes are kept because non-minimal encodings are legal on the wire
/// and txids must be computed over the original encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSize {
    pub value: u64,
    pub raw: Bytes,
}

impl CompactSize {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

pub fn read_compact_size(cursor: &mut Cursor) -> Result<CompactSize, ParseError> {
    let start = cursor.position();
    let value = match cursor.read_u8()? {
        0xFD => cursor.read_u16_le().map(u64::from),
        0xFE => cursor.read_u32_le().map(u64::from),
        0xFF => cursor.read_u64_le(),
        b => Ok(u64::from(b)),
    };
    let value = match value {
        Ok(value) => value,
        Err(e) => {
            cursor.seek(start);
            return Err(e);
        }
    };

    let consumed = cursor.position() - start;
    cursor.seek(start);
    let raw = cursor.read(consumed)?;
    Ok(CompactSize { value, raw })
}

pub fn compact_size_len(value: u64) -> usize {
    match value {
        0..=0xFC => 1,
        0xFD..=0xFFFF => 3,
        0x10000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

/// Minimal encoding of `value`.
pub fn encode_compact_size(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(compact_size_len(value));
    match value {
        0..=0xFC => out.push(value as u8),
        0xFD..=0xFFFF => {
            out.push(0xFD);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x10000..=0xFFFF_FFFF => {
            out.push(0xFE);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xFF);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}
