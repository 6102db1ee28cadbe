use std::io;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while decoding the bytes of a single block file.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseError {
    #[error("truncated stream at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("malformed transaction at offset {offset}: {reason}")]
    MalformedTransaction { offset: usize, reason: String },
}

impl ParseError {
    pub fn is_truncation(&self) -> bool {
        matches!(self, ParseError::TruncatedStream { .. })
    }
}

/// A transcript line that does not follow the `tag,field,...;` layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("unknown record tag `{0}`")]
    UnknownTag(String),
    #[error("`{tag}` record expects {expected} fields, found {found}")]
    FieldCount {
        tag: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid {field}: `{value}`")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
