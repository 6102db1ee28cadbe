use chrono::{DateTime, Utc};

use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::models::{BlockHeader, Hash256};
use crate::utils::hash_wire;

pub const HEADER_SIZE: usize = 80;

// Target of difficulty 1 expressed as compact bits (0x1d00ffff).
const MAX_TARGET_EXPONENT: i32 = 0x1d;
const MAX_TARGET_COEFFICIENT: f64 = 0xffff as f64;

/// Decodes the fixed 80-byte header and hashes the raw bytes it came from.
pub fn read_header(cursor: &mut Cursor) -> Result<BlockHeader, ParseError> {
    let raw = cursor.read(HEADER_SIZE)?;
    let hash = hash_wire(&raw);

    let mut fields = Cursor::new(raw);
    Ok(BlockHeader {
        version: fields.read_i32_le()?,
        previous_block: Hash256::new(fields.read_reversed::<32>()?),
        merkle_root: Hash256::new(fields.read_reversed::<32>()?),
        timestamp: fields.read_u32_le()?,
        bits: fields.read_u32_le()?,
        nonce: fields.read_u32_le()?,
        hash,
    })
}

impl BlockHeader {
    pub fn time(&self) -> DateTime<Utc> {
        // Every u32 second count is within chrono's range.
        DateTime::<Utc>::from_timestamp(i64::from(self.timestamp), 0).unwrap_or_default()
    }

    /// Difficulty relative to the minimum target, derived from the compact `bits`.
    pub fn difficulty(&self) -> f64 {
        let exponent = (self.bits >> 24) as i32;
        let coefficient = f64::from(self.bits & 0x00ff_ffff);
        if coefficient == 0.0 {
            return 0.0;
        }
        let shift = 8 * (MAX_TARGET_EXPONENT - exponent);
        MAX_TARGET_COEFFICIENT / coefficient * 2f64.powi(shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_vectors::*;

    #[test]
    fn genesis_header_fields_and_hash() {
        let mut cursor = Cursor::new(bytes(GENESIS_HEADER));
        let header = read_header(&mut cursor).unwrap();

        assert!(cursor.is_at_end());
        assert_eq!(header.version, 1);
        assert_eq!(header.previous_block, Hash256::ZERO);
        assert_eq!(header.merkle_root.to_hex(), GENESIS_TXID);
        assert_eq!(header.timestamp, 1_231_006_505);
        assert_eq!(header.bits, 0x1d00_ffff);
        assert_eq!(header.nonce, 2_083_236_893);
        assert_eq!(header.hash.to_hex(), GENESIS_HASH);
        assert_eq!(header.time().to_rfc3339(), "2009-01-03T18:15:05+00:00");
        assert_eq!(header.difficulty(), 1.0);
    }

    #[test]
    fn difficulty_scales_with_target() {
        let mut header = read_header(&mut Cursor::new(bytes(GENESIS_HEADER))).unwrap();
        // Block 100000 bits.
        header.bits = 0x1b04_864c;
        let difficulty = header.difficulty();
        assert!((difficulty - 14_484.162_361_225_399).abs() < 1e-6, "{difficulty}");
    }

    #[test]
    fn short_header_is_truncation() {
        let mut raw = bytes(GENESIS_HEADER);
        raw.truncate(79);
        let mut cursor = Cursor::new(raw);
        let err = read_header(&mut cursor).unwrap_err();
        assert_eq!(
            err,
            ParseError::TruncatedStream { offset: 0, needed: 80, remaining: 79 }
        );
    }
}
