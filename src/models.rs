use std::fmt;

use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::merkle::MerkleCheck;

/// A 32-byte hash held in natural (display) byte order.
///
/// The wire carries these little-endian; use [`Hash256::from_wire`] and
/// [`Hash256::to_wire`] at the serialization boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    pub const fn new(natural: [u8; 32]) -> Self {
        Hash256(natural)
    }

    pub fn from_wire(mut wire: [u8; 32]) -> Self {
        wire.reverse();
        Hash256(wire)
    }

    pub fn to_wire(&self) -> [u8; 32] {
        let mut out = self.0;
        out.reverse();
        out
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Uppercase hex in display order, as written to transcripts.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Hash256(out))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub previous_block: Hash256,
    pub merkle_root: Hash256,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub hash: Hash256,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub header: BlockHeader,
    /// Size announced by the frame header; not validated.
    pub size: u32,
    pub tx_count: u64,
    pub transactions: Vec<Transaction>,
    pub merkle: MerkleCheck,
}

/// Per-input witness stack.
pub type Witness = Vec<Bytes>;

#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: i32,
    pub segwit: bool,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    /// One stack per input when `segwit`, empty otherwise.
    pub witnesses: Vec<Witness>,
    pub locktime: u32,
    pub txid: Hash256,
    /// Legacy serialization the txid is computed over.
    pub canonical: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub previous_txid: Hash256,
    pub previous_output_index: u32,
    pub script_sig: Bytes,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub output_index: u32,
    pub value: u64,
    pub script_pub_key: Bytes,
    pub address: Option<String>,
}
