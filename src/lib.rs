//! Decodes Bitcoin `blk*.dat` files into `tx`/`txin`/`txout` transcripts,
//! checking each block's merkle root along the way.

pub mod address;
pub mod compact_size;
pub mod config;
pub mod cursor;
pub mod error;
pub mod file_reader;
pub mod header;
pub mod merkle;
pub mod models;
pub mod processing;
pub mod records;
pub mod transaction;
pub mod utils;

#[cfg(test)]
mod test_vectors;

pub use address::{AddressResolver, NetworkAddressResolver, NoAddressResolver};
pub use config::{Config, FilePattern};
pub use error::{Error, ParseError, Result};
pub use models::{Block, BlockHeader, Hash256, Input, Output, Transaction};
pub use processing::{parse_blocks, transcribe, BlockCheck, BlockIter, FileReport};
pub use records::Record;
