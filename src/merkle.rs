//! Merkle root construction over display-order transaction ids.
//!
//! Hashing happens on wire (little-endian) order, so each pair is reversed
//! before concatenation and the digest is reversed back afterwards. Odd
//! levels duplicate their last hash.

use serde::Serialize;

use crate::models::Hash256;
use crate::utils::hash_wire;

fn hash_pair(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&left.to_wire());
    buf[32..].copy_from_slice(&right.to_wire());
    hash_wire(&buf)
}

/// Computes the root level by level. Returns `None` for an empty list.
pub fn merkle_root(txids: &[Hash256]) -> Option<Hash256> {
    let mut level: Vec<Hash256> = txids.to_vec();
    if level.is_empty() {
        return None;
    }

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }

    Some(level[0])
}

/// Outcome of checking a header's claimed root against its transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MerkleCheck {
    pub claimed: Hash256,
    pub computed: Option<Hash256>,
}

impl MerkleCheck {
    pub fn is_valid(&self) -> bool {
        self.computed == Some(self.claimed)
    }
}

pub fn verify_merkle_root(claimed: Hash256, txids: &[Hash256]) -> MerkleCheck {
    MerkleCheck {
        claimed,
        computed: merkle_root(txids),
    }
}
