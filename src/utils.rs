use sha2::{Digest, Sha256};

use crate::models::Hash256;

pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first_hash = Sha256::digest(data);
    let mut hasher = Sha256::new();
    hasher.update(first_hash);
    hasher.finalize().into()
}

/// Double-SHA256 of wire bytes, returned in display order.
pub fn hash_wire(data: &[u8]) -> Hash256 {
    Hash256::from_wire(double_sha256(data))
}
