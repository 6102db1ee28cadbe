//! Mainnet vectors shared by the unit tests.

pub const GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

pub const GENESIS_COINBASE: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

pub const GENESIS_HASH: &str = "000000000019D6689C085AE165831E934FF763AE46A2A6C172B3F1B60A8CE26F";
pub const GENESIS_TXID: &str = "4A5E1E4BAAB89F3A32518A88C31BC87F618F76673E2CC77AB2127B7AFDEDA33B";

/// Synthetic one-input witness transaction paying P2WPKH to the genesis key hash.
pub const SEGWIT_TX: &str = "0200000000010111111111111111111111111111111111111111111111111111111111111111110100000000feffffff01102700000000000016001462e907b15cbf27d5425399ebf6f0fb50ebb88f180203aabbcc02ddee00000000";
/// `SEGWIT_TX` with marker, flag and witness stacks removed.
pub const SEGWIT_TX_STRIPPED: &str = "020000000111111111111111111111111111111111111111111111111111111111111111110100000000feffffff01102700000000000016001462e907b15cbf27d5425399ebf6f0fb50ebb88f1800000000";
pub const SEGWIT_TXID: &str = "B3BC6182FC553D49E6F7D233EA31C83A63E67EFB6F7F40FFF99DADB4C66A295D";

pub const MAINNET_MAGIC: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];

pub fn bytes(hex_str: &str) -> Vec<u8> {
    hex::decode(hex_str).expect("valid test hex")
}

pub fn genesis_block() -> Vec<u8> {
    let mut block = bytes(GENESIS_HEADER);
    block.push(0x01);
    block.extend(bytes(GENESIS_COINBASE));
    block
}

/// Wraps a serialized block in its blk-file frame.
pub fn frame(block: &[u8]) -> Vec<u8> {
    let mut out = MAINNET_MAGIC.to_vec();
    out.extend_from_slice(&(block.len() as u32).to_le_bytes());
    out.extend_from_slice(block);
    out
}
