use bytes::Bytes;

use crate::address::AddressResolver;
use crate::compact_size::{compact_size_len, read_compact_size};
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::models::{Hash256, Input, Output, Transaction, Witness};
use crate::utils::hash_wire;

const WITNESS_MARKER: u8 = 0x00;
const WITNESS_FLAG: u8 = 0x01;

// Smallest possible wire encodings of one item.
const MIN_INPUT_SIZE: usize = 41;
const MIN_OUTPUT_SIZE: usize = 9;
const MIN_WITNESS_ITEM_SIZE: usize = 1;

/// Decodes one serialized transaction, legacy or witness-tagged.
///
/// The txid is computed over the legacy serialization, rebuilt from the
/// exact bytes read so that non-minimal compact sizes hash as they appear
/// on the wire.
pub fn read_transaction(
    cursor: &mut Cursor,
    resolver: &dyn AddressResolver,
) -> Result<Transaction, ParseError> {
    let mut canonical = Vec::new();

    let version_raw = cursor.read_array::<4>()?;
    canonical.extend_from_slice(&version_raw);

    let segwit = read_witness_marker(cursor)?;

    let input_count = read_compact_size(cursor)?;
    canonical.extend_from_slice(&input_count.raw);
    let mut inputs = Vec::with_capacity(check_count(
        cursor,
        input_count.value,
        MIN_INPUT_SIZE,
        "input",
    )?);
    for _ in 0..input_count.value {
        inputs.push(read_input(cursor, &mut canonical)?);
    }

    let output_count = read_compact_size(cursor)?;
    canonical.extend_from_slice(&output_count.raw);
    let mut outputs = Vec::with_capacity(check_count(
        cursor,
        output_count.value,
        MIN_OUTPUT_SIZE,
        "output",
    )?);
    for i in 0..output_count.value {
        outputs.push(read_output(cursor, i as u32, resolver, &mut canonical)?);
    }

    let witnesses = if segwit {
        inputs
            .iter()
            .map(|_| read_witness(cursor))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    let locktime_raw = cursor.read_array::<4>()?;
    canonical.extend_from_slice(&locktime_raw);

    let txid = hash_wire(&canonical);

    Ok(Transaction {
        version: i32::from_le_bytes(version_raw),
        segwit,
        inputs,
        outputs,
        witnesses,
        locktime: u32::from_le_bytes(locktime_raw),
        txid,
        canonical: Bytes::from(canonical),
    })
}

/// Consumes the `00 01` marker/flag pair if present, otherwise rewinds.
fn read_witness_marker(cursor: &mut Cursor) -> Result<bool, ParseError> {
    let start = cursor.position();
    if cursor.remaining() >= 2
        && cursor.read_u8()? == WITNESS_MARKER
        && cursor.read_u8()? == WITNESS_FLAG
    {
        return Ok(true);
    }
    cursor.seek(start);
    Ok(false)
}

/// Rejects an item count that the remaining bytes cannot hold, given the
/// smallest encoding of one item.
pub(crate) fn check_count(
    cursor: &Cursor,
    count: u64,
    min_item_size: usize,
    what: &str,
) -> Result<usize, ParseError> {
    let remaining = cursor.remaining();
    if count > (remaining / min_item_size) as u64 {
        return Err(ParseError::MalformedTransaction {
            offset: cursor.position(),
            reason: format!("{what} count {count} exceeds {remaining} remaining bytes"),
        });
    }
    Ok(count as usize)
}

/// Reads a length-prefixed payload whose length was already decoded.
fn read_payload(cursor: &mut Cursor, len: u64, what: &str) -> Result<Bytes, ParseError> {
    let remaining = cursor.remaining();
    if len > remaining as u64 {
        return Err(ParseError::MalformedTransaction {
            offset: cursor.position(),
            reason: format!("{what} length {len} exceeds {remaining} remaining bytes"),
        });
    }
    cursor.read(len as usize)
}

fn read_input(cursor: &mut Cursor, canonical: &mut Vec<u8>) -> Result<Input, ParseError> {
    let previous_txid = cursor.read_array::<32>()?;
    let previous_output_index = cursor.read_array::<4>()?;
    let script_len = read_compact_size(cursor)?;
    let script_sig = read_payload(cursor, script_len.value, "scriptSig")?;
    let sequence = cursor.read_array::<4>()?;

    canonical.extend_from_slice(&previous_txid);
    canonical.extend_from_slice(&previous_output_index);
    canonical.extend_from_slice(&script_len.raw);
    canonical.extend_from_slice(&script_sig);
    canonical.extend_from_slice(&sequence);

    Ok(Input {
        previous_txid: Hash256::from_wire(previous_txid),
        previous_output_index: u32::from_le_bytes(previous_output_index),
        script_sig,
        sequence: u32::from_le_bytes(sequence),
    })
}

fn read_output(
    cursor: &mut Cursor,
    output_index: u32,
    resolver: &dyn AddressResolver,
    canonical: &mut Vec<u8>,
) -> Result<Output, ParseError> {
    let value = cursor.read_array::<8>()?;
    let script_len = read_compact_size(cursor)?;
    let script_pub_key = read_payload(cursor, script_len.value, "scriptPubKey")?;

    canonical.extend_from_slice(&value);
    canonical.extend_from_slice(&script_len.raw);
    canonical.extend_from_slice(&script_pub_key);

    let address = resolver.resolve(&script_pub_key);
    Ok(Output {
        output_index,
        value: u64::from_le_bytes(value),
        script_pub_key,
        address,
    })
}

fn read_witness(cursor: &mut Cursor) -> Result<Witness, ParseError> {
    let item_count = read_compact_size(cursor)?;
    let mut items = Vec::with_capacity(check_count(
        cursor,
        item_count.value,
        MIN_WITNESS_ITEM_SIZE,
        "witness item",
    )?);
    for _ in 0..item_count.value {
        let len = read_compact_size(cursor)?;
        items.push(read_payload(cursor, len.value, "witness item")?);
    }
    Ok(items)
}

impl Input {
    /// Coinbase inputs spend the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.previous_txid.is_zero() && self.previous_output_index == u32::MAX
    }
}

impl Transaction {
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase()
    }

    /// Size of the legacy serialization.
    pub fn base_size(&self) -> usize {
        self.canonical.len()
    }

    /// Size of the full wire serialization, witness data included.
    pub fn size(&self) -> usize {
        if !self.segwit {
            return self.base_size();
        }
        self.base_size() + 2 + self.witness_size()
    }

    pub fn weight(&self) -> usize {
        self.base_size() * 3 + self.size()
    }

    fn witness_size(&self) -> usize {
        self.witnesses
            .iter()
            .map(|stack| {
                compact_size_len(stack.len() as u64)
                    + stack
                        .iter()
                        .map(|item| compact_size_len(item.len() as u64) + item.len())
                        .sum::<usize>()
            })
            .sum()
    }
}
