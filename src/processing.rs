use std::io::{self, Write};
use std::iter::FusedIterator;

use bytes::Bytes;
use log::{debug, warn};
use serde::Serialize;

use crate::address::AddressResolver;
use crate::compact_size::{compact_size_len, read_compact_size};
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::header::{read_header, HEADER_SIZE};
use crate::merkle::{verify_merkle_root, MerkleCheck};
use crate::models::{Block, Hash256};
use crate::records::block_records;
use crate::transaction::{check_count, read_transaction};

const MIN_TX_SIZE: usize = 10;

/// Lazily decodes the framed blocks of one block file.
///
/// Yields each block once it has been fully decoded and its merkle root
/// checked. The first error is yielded once and ends the sequence.
pub struct BlockIter<'r> {
    cursor: Cursor,
    resolver: &'r dyn AddressResolver,
    done: bool,
}

pub fn parse_blocks(data: impl Into<Bytes>, resolver: &dyn AddressResolver) -> BlockIter<'_> {
    BlockIter {
        cursor: Cursor::new(data),
        resolver,
        done: false,
    }
}

impl BlockIter<'_> {
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    fn read_block(&mut self) -> Result<Option<Block>, ParseError> {
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let magic = self.cursor.read_array::<4>()?;
        if magic == [0u8; 4] {
            // Block files are preallocated; the unused tail is zero-filled.
            debug!(
                "zero padding at offset {}, stopping scan",
                self.cursor.position() - 4
            );
            return Ok(None);
        }
        let size = self.cursor.read_u32_le()?;

        let header = read_header(&mut self.cursor)?;
        let tx_count = read_compact_size(&mut self.cursor)?.value;
        let capacity = check_count(&self.cursor, tx_count, MIN_TX_SIZE, "transaction")?;
        let mut transactions = Vec::with_capacity(capacity);
        for _ in 0..tx_count {
            transactions.push(read_transaction(&mut self.cursor, self.resolver)?);
        }

        let txids: Vec<Hash256> = transactions.iter().map(|tx| tx.txid).collect();
        let merkle = verify_merkle_root(header.merkle_root, &txids);
        if !merkle.is_valid() {
            warn!(
                "Merkle root mismatch in block {}: header {}, computed {}",
                header.hash,
                merkle.claimed,
                merkle
                    .computed
                    .map(|h| h.to_hex())
                    .unwrap_or_else(|| "none".to_string())
            );
        }
        debug!(
            "block {} ({}, difficulty {:.2}) with {} transactions",
            header.hash,
            header.time(),
            header.difficulty(),
            tx_count
        );

        Ok(Some(Block {
            header,
            size,
            tx_count,
            transactions,
            merkle,
        }))
    }
}

impl Iterator for BlockIter<'_> {
    type Item = Result<Block, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for BlockIter<'_> {}

impl Block {
    /// BIP141 block weight: header and transaction count at four units per
    /// byte, plus the weight of every transaction.
    pub fn weight(&self) -> u64 {
        let overhead = (HEADER_SIZE + compact_size_len(self.tx_count)) as u64;
        overhead * 4
            + self
                .transactions
                .iter()
                .map(|tx| tx.weight() as u64)
                .sum::<u64>()
    }
}

/// Verification outcome of one block, as handed to the loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockCheck {
    pub block_hash: Hash256,
    pub tx_count: u64,
    /// Size declared by the block file frame.
    pub size: u32,
    pub weight: u64,
    pub difficulty: f64,
    pub merkle: MerkleCheck,
    pub verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileReport {
    pub source: String,
    pub blocks: Vec<BlockCheck>,
    pub transactions: u64,
    pub records: u64,
    pub error: Option<ParseError>,
}

impl FileReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &BlockCheck> {
        self.blocks.iter().filter(|b| !b.verified)
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes the records of each decoded block to `out` as it completes.
///
/// A parse error stops the scan and is recorded in the report; records of the
/// blocks before it have already been written. Only I/O errors are returned.
pub fn transcribe<I, W>(blocks: I, source: &str, out: &mut W) -> io::Result<FileReport>
where
    I: Iterator<Item = Result<Block, ParseError>>,
    W: Write,
{
    let mut report = FileReport::new(source);

    for block in blocks {
        let block = match block {
            Ok(block) => block,
            Err(e) => {
                report.error = Some(e);
                break;
            }
        };

        for record in block_records(&block) {
            writeln!(out, "{record}")?;
            report.records += 1;
        }
        report.transactions += block.transactions.len() as u64;
        report.blocks.push(BlockCheck {
            block_hash: block.header.hash,
            tx_count: block.tx_count,
            size: block.size,
            weight: block.weight(),
            difficulty: block.header.difficulty(),
            merkle: block.merkle,
            verified: block.merkle.is_valid(),
        });
    }

    Ok(report)
}
