use super::CsvError;
use std::collections::BTreeMap;

/// One data line mapped onto the header contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number in the source file (the header is line 1).
    pub line_number: u64,
    pub fields: BTreeMap<String, String>,
}

impl CsvRow {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }
}

/// Decode `content` whose first record must carry exactly `expected_headers`, in any order.
///
/// Blank lines are skipped. Every other record must have one value per header.
/// Quoted values may contain commas and line breaks; a row is numbered by the
/// physical line it starts on.
pub fn decode(content: &str, expected_headers: &[&str]) -> Result<Vec<CsvRow>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(clean_header).collect(),
        None => Vec::new(),
    };
    validate_headers(&headers, expected_headers)?;

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let line_number = starting_line(content, &record);
        if record.len() != headers.len() {
            return Err(CsvError::FieldCount {
                line: line_number,
                expected: headers.len(),
                found: record.len(),
            });
        }

        rows.push(CsvRow {
            line_number,
            fields: headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        });
    }

    Ok(rows)
}

/// Encode `rows` (values in header order) below a header line, one `\n`-terminated line each.
pub fn encode(headers: &[&str], rows: &[Vec<String>]) -> Result<String, CsvError> {
    if rows.is_empty() {
        return Err(CsvError::NothingToEncode);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for (row, values) in rows.iter().enumerate() {
        if values.len() != headers.len() {
            return Err(CsvError::RowWidth {
                row,
                expected: headers.len(),
                found: values.len(),
            });
        }
        writer.write_record(values)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CsvError::Encoding(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| CsvError::Encoding(err.to_string()))
}

/// Line the record's first value sits on. The reader's own position points
/// before any blank lines it skipped, so those are stepped over here.
fn starting_line(content: &str, record: &csv::StringRecord) -> u64 {
    let start = record
        .position()
        .map_or(0, |position| position.byte() as usize);
    let rest = content.get(start..).unwrap_or_default();
    let blank = rest.len() - rest.trim_start_matches(['\r', '\n']).len();
    let before = content.get(..start + blank).unwrap_or_default();
    before.matches('\n').count() as u64 + 1
}

fn clean_header(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

fn validate_headers(headers: &[String], expected: &[&str]) -> Result<(), CsvError> {
    let matches = headers.len() == expected.len()
        && expected
            .iter()
            .all(|name| headers.iter().any(|header| header == name));

    if matches {
        Ok(())
    } else {
        Err(CsvError::HeaderMismatch {
            expected: expected.iter().map(|name| name.to_string()).collect(),
            found: headers.to_vec(),
        })
    }
}
