//! Transcript records handed to the storage loader.
//!
//! One line per record, comma separated and terminated by `;`:
//!
//! ```text
//! tx,<txid>,<timestamp>;
//! txin,<previous txid>,<consuming txid>,<previous output index>;
//! txout,<txid>,<output index>,<address or empty>,<value>;
//! ```

use std::fmt;
use std::iter;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::RecordError;
use crate::models::{Block, Hash256, Transaction};

pub const SATS_PER_COIN: u64 = 100_000_000;
const COIN_DECIMALS: usize = 8;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Tx {
        txid: Hash256,
        timestamp: u32,
    },
    TxIn {
        previous_txid: Hash256,
        txid: Hash256,
        previous_output_index: u32,
    },
    TxOut {
        txid: Hash256,
        output_index: u32,
        address: Option<String>,
        value: u64,
    },
}

/// Renders satoshis in whole coins with all eight decimals, e.g. `50.00000000`.
pub fn format_amount(sats: u64) -> String {
    format!(
        "{}.{:0width$}",
        sats / SATS_PER_COIN,
        sats % SATS_PER_COIN,
        width = COIN_DECIMALS
    )
}

pub fn parse_amount(s: &str) -> Option<u64> {
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() || frac.len() > COIN_DECIMALS || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let whole: u64 = whole.parse().ok()?;
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<width$}", width = COIN_DECIMALS).parse().ok()?
    };
    whole.checked_mul(SATS_PER_COIN)?.checked_add(frac)
}

pub fn format_timestamp(timestamp: u32) -> String {
    DateTime::<Utc>::from_timestamp(i64::from(timestamp), 0)
        .unwrap_or_default()
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn parse_timestamp(s: &str) -> Option<u32> {
    let parsed = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()?;
    u32::try_from(parsed.and_utc().timestamp()).ok()
}

/// Records for one transaction: the `tx` line, then its inputs, then its outputs.
pub fn transaction_records(tx: &Transaction, timestamp: u32) -> impl Iterator<Item = Record> + '_ {
    let txid = tx.txid;
    let inputs = tx.inputs.iter().map(move |input| Record::TxIn {
        previous_txid: input.previous_txid,
        txid,
        previous_output_index: input.previous_output_index,
    });
    let outputs = tx.outputs.iter().map(move |output| Record::TxOut {
        txid,
        output_index: output.output_index,
        address: output.address.clone(),
        value: output.value,
    });

    iter::once(Record::Tx { txid, timestamp })
        .chain(inputs)
        .chain(outputs)
}

pub fn block_records(block: &Block) -> impl Iterator<Item = Record> + '_ {
    let timestamp = block.header.timestamp;
    block
        .transactions
        .iter()
        .flat_map(move |tx| transaction_records(tx, timestamp))
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Tx { txid, timestamp } => {
                write!(f, "tx,{},{};", txid, format_timestamp(*timestamp))
            }
            Record::TxIn {
                previous_txid,
                txid,
                previous_output_index,
            } => write!(f, "txin,{previous_txid},{txid},{previous_output_index};"),
            Record::TxOut {
                txid,
                output_index,
                address,
                value,
            } => write!(
                f,
                "txout,{},{},{},{};",
                txid,
                output_index,
                address.as_deref().unwrap_or(""),
                format_amount(*value)
            ),
        }
    }
}

fn field<T>(
    value: &str,
    name: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, RecordError> {
    parse(value).ok_or_else(|| RecordError::InvalidField {
        field: name,
        value: value.to_string(),
    })
}

fn hash_field(value: &str, name: &'static str) -> Result<Hash256, RecordError> {
    field(value, name, |v| Hash256::from_hex(v).ok())
}

fn expect_fields(tag: &'static str, fields: &[&str], expected: usize) -> Result<(), RecordError> {
    if fields.len() != expected {
        return Err(RecordError::FieldCount {
            tag,
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let line = line.strip_suffix(';').unwrap_or(line);
        let mut parts = line.split(',');
        let tag = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();

        match tag {
            "tx" => {
                expect_fields("tx", &fields, 2)?;
                Ok(Record::Tx {
                    txid: hash_field(fields[0], "txid")?,
                    timestamp: field(fields[1], "timestamp", parse_timestamp)?,
                })
            }
            "txin" => {
                expect_fields("txin", &fields, 3)?;
                Ok(Record::TxIn {
                    previous_txid: hash_field(fields[0], "previous txid")?,
                    txid: hash_field(fields[1], "txid")?,
                    previous_output_index: field(fields[2], "previous output index", |v| {
                        v.parse().ok()
                    })?,
                })
            }
            "txout" => {
                expect_fields("txout", &fields, 4)?;
                Ok(Record::TxOut {
                    txid: hash_field(fields[0], "txid")?,
                    output_index: field(fields[1], "output index", |v| v.parse().ok())?,
                    address: Some(fields[2])
                        .filter(|a| !a.is_empty())
                        .map(str::to_string),
                    value: field(fields[3], "value", parse_amount)?,
                })
            }
            other => Err(RecordError::UnknownTag(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::NoAddressResolver;
    use crate::cursor::Cursor;
    use crate::test_vectors::*;
    use crate::transaction::read_transaction;

    const ZERO_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn amounts_use_eight_decimals() {
        assert_eq!(format_amount(5_000_000_000), "50.00000000");
        assert_eq!(format_amount(0), "0.00000000");
        assert_eq!(format_amount(1), "0.00000001");
        assert_eq!(format_amount(2_099_999_997_690_000), "20999999.97690000");
    }

    #[test]
    fn amounts_parse_back_exactly() {
        assert_eq!(parse_amount("50.00000000"), Some(5_000_000_000));
        assert_eq!(parse_amount("0.1"), Some(10_000_000));
        assert_eq!(parse_amount("7"), Some(700_000_000));
        assert_eq!(parse_amount("1.000000001"), None);
        assert_eq!(parse_amount("-1.0"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn coinbase_transcript_lines() {
        let tx = read_transaction(&mut Cursor::new(bytes(GENESIS_COINBASE)), &NoAddressResolver)
            .unwrap();
        let lines: Vec<String> = transaction_records(&tx, 1_231_006_505)
            .map(|r| r.to_string())
            .collect();

        assert_eq!(
            lines,
            vec![
                format!("tx,{GENESIS_TXID},2009-01-03T18:15:05;"),
                format!("txin,{ZERO_HEX},{GENESIS_TXID},4294967295;"),
                format!("txout,{GENESIS_TXID},0,,50.00000000;"),
            ]
        );
    }

    #[test]
    fn lines_parse_by_leading_tag() {
        let txout: Record = format!("txout,{GENESIS_TXID},1,1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa,0.5;")
            .parse()
            .unwrap();
        assert_eq!(
            txout,
            Record::TxOut {
                txid: Hash256::from_hex(GENESIS_TXID).unwrap(),
                output_index: 1,
                address: Some("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string()),
                value: 50_000_000,
            }
        );

        let tx: Record = format!("tx,{GENESIS_TXID},2009-01-03T18:15:05;\n").parse().unwrap();
        assert_eq!(
            tx,
            Record::Tx {
                txid: Hash256::from_hex(GENESIS_TXID).unwrap(),
                timestamp: 1_231_006_505,
            }
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert_eq!(
            "block,abc;".parse::<Record>(),
            Err(RecordError::UnknownTag("block".to_string()))
        );
        assert_eq!(
            format!("txin,{GENESIS_TXID},{GENESIS_TXID};").parse::<Record>(),
            Err(RecordError::FieldCount { tag: "txin", expected: 3, found: 2 })
        );
        assert!(matches!(
            "tx,XYZ,2009-01-03T18:15:05;".parse::<Record>(),
            Err(RecordError::InvalidField { field: "txid", .. })
        ));
    }
}
