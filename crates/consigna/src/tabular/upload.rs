use super::codec::{decode, CsvRow};
use super::CsvError;

pub const MIN_SIZE_IN_BYTES: u64 = 1;
pub const MAX_SIZE_IN_BYTES: u64 = 1_000_000;

/// CSV content that passed the upload gate (size, MIME type, non-empty body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    content: String,
}

impl CsvUpload {
    /// Gate an upload before any decoding happens; the first failing check wins.
    pub fn new(
        mime_type: &str,
        size_in_bytes: u64,
        content: impl Into<String>,
    ) -> Result<Self, CsvError> {
        validate_size(size_in_bytes)?;
        validate_mime_type(mime_type)?;

        let content = content.into();
        if content.trim().is_empty() {
            return Err(CsvError::EmptyContent);
        }

        Ok(Self { content })
    }

    /// Gate raw bytes. Content that is not UTF-8 is read as Windows-1252, the
    /// code page spreadsheet tools on Windows save CSV files in.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self, CsvError> {
        let content = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => bytes.iter().map(|byte| windows_1252(*byte)).collect(),
        };
        Self::new(mime_type, bytes.len() as u64, content)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn decode(&self, expected_headers: &[&str]) -> Result<Vec<CsvRow>, CsvError> {
        decode(&self.content, expected_headers)
    }
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F; its five unassigned
/// bytes keep their Latin-1 control character.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

fn windows_1252(byte: u8) -> char {
    match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

fn validate_size(size_in_bytes: u64) -> Result<(), CsvError> {
    if (MIN_SIZE_IN_BYTES..=MAX_SIZE_IN_BYTES).contains(&size_in_bytes) {
        Ok(())
    } else {
        Err(CsvError::InvalidSize { size_in_bytes })
    }
}

fn validate_mime_type(mime_type: &str) -> Result<(), CsvError> {
    let trimmed = mime_type.trim();
    if trimmed.is_empty() {
        return Err(CsvError::EmptyMimeType);
    }

    match trimmed.parse::<mime::Mime>() {
        Ok(parsed) if parsed.essence_str() == mime::TEXT_CSV.essence_str() => Ok(()),
        _ => Err(CsvError::InvalidMimeType),
    }
}
