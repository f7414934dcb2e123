//! Comma-separated import/export with a fixed header contract.
//!
//! Decoding validates the header line against the expected column set before a
//! single data row is looked at, and tags every row with the line it came from
//! so import errors can point at the offending line.

mod codec;
mod upload;

pub use codec::{decode, encode, CsvRow};
pub use upload::{CsvUpload, MAX_SIZE_IN_BYTES, MIN_SIZE_IN_BYTES};

use crate::error::ErrorKind;

/// Failure raised while gating, decoding or encoding CSV content.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("The file mimeType cannot be empty")]
    EmptyMimeType,
    #[error("The file type is not valid")]
    InvalidMimeType,
    #[error("The file size is not valid")]
    InvalidSize { size_in_bytes: u64 },
    #[error("The file Content cannot be empty")]
    EmptyContent,
    #[error("The csv file is not valid")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("The csv file is not valid: line {line} has {found} fields, expected {expected}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("There is no data to create the csv")]
    NothingToEncode,
    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("The csv file is not valid: {0}")]
    Parse(#[from] csv::Error),
    #[error("could not write csv content: {0}")]
    Encoding(String),
}

impl CsvError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedInput
    }
}
