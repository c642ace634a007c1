//! Tabular input parsing with format, encoding and delimiter auto-detection.
//!
//! Spreadsheets (xlsx, xlsm, xls, ods) are read with calamine; anything else
//! is treated as delimited text. Every row becomes a JSON object keyed by the
//! header row, with every value rendered as a string. No report-specific
//! logic here.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Cursor;
use std::path::Path;

use crate::error::{ParseError, ParseResult};

/// Rendering used for native date cells.
const DATETIME_CELL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// How the input bytes were interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// A workbook read with calamine.
    Spreadsheet,
    /// CSV / TSV / pipe-separated text.
    Delimited,
}

impl SourceFormat {
    /// Sniff the format from magic bytes.
    ///
    /// ZIP containers (xlsx, xlsm, ods) and OLE2 compound files (xls) are
    /// spreadsheets; everything else is delimited text.
    pub fn detect(bytes: &[u8]) -> Self {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SourceFormat::Spreadsheet
        } else {
            SourceFormat::Delimited
        }
    }
}

/// Options controlling how input is read.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Worksheet to read (first sheet when absent).
    pub sheet: Option<String>,
    /// Delimiter for text input (auto-detected when absent).
    pub delimiter: Option<char>,
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Parsed records as JSON objects
    pub records: Vec<Value>,
    /// Column headers
    pub headers: Vec<String>,
    /// How the bytes were read
    pub format: SourceFormat,
    /// Detected encoding (delimited text only)
    pub encoding: Option<String>,
    /// Detected or used delimiter (delimited text only)
    pub delimiter: Option<char>,
    /// Worksheet that was read (spreadsheets only)
    pub sheet: Option<String>,
}

/// Parse a file with auto-detection of format, encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P, options: &ParseOptions) -> ParseResult<ParsedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, options)
}

/// Parse raw bytes with auto-detection of format, encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8], options: &ParseOptions) -> ParseResult<ParsedTable> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    match SourceFormat::detect(bytes) {
        SourceFormat::Spreadsheet => parse_spreadsheet(bytes, options.sheet.as_deref()),
        SourceFormat::Delimited => {
            let encoding = detect_encoding(bytes);
            let content = decode_content(bytes, &encoding);
            let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(&content));
            parse_delimited(&content, delimiter, encoding)
        }
    }
}

// =============================================================================
// Spreadsheets
// =============================================================================

/// Parse workbook bytes, reading `sheet` or the first worksheet.
pub fn parse_spreadsheet(bytes: &[u8], sheet: Option<&str>) -> ParseResult<ParsedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        Some(name) => return Err(ParseError::SheetNotFound(name.to_string())),
        None => sheet_names.first().cloned().ok_or(ParseError::EmptyFile)?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or(ParseError::NoHeaders)?
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ParseError::NoHeaders);
    }

    let records = rows
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|values| values.iter().any(|v| !v.trim().is_empty()))
        .map(|values| build_record(&headers, values))
        .collect();

    Ok(ParsedTable {
        records,
        headers,
        format: SourceFormat::Spreadsheet,
        encoding: None,
        delimiter: None,
        sheet: Some(sheet_name),
    })
}

/// Render a cell the way it reads in the sheet.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        // f64 Display drops a zero fraction: 42.0 -> "42"
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format(DATETIME_CELL_FORMAT).to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::Error(e) => e.to_string(),
    }
}

// =============================================================================
// Delimited Text
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
///
/// Latin-1 goes through windows-1252, which agrees with it on every printable
/// byte. Unknown encodings and invalid UTF-8 fall back to a lossy UTF-8 decode.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use remesas::parser::parse_delimited;
///
/// let result = parse_delimited("name;age\nAlice;30", ';', "utf-8".into()).unwrap();
/// assert_eq!(result.records[0]["name"], "Alice");
/// ```
pub fn parse_delimited(content: &str, delimiter: char, encoding: String) -> ParseResult<ParsedTable> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter))
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(ParseError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let values: Vec<String> = row.iter().map(str::to_string).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        records.push(build_record(&headers, values));
    }

    Ok(ParsedTable {
        records,
        headers,
        format: SourceFormat::Delimited,
        encoding: Some(encoding),
        delimiter: Some(delimiter),
        sheet: None,
    })
}

/// csv only takes single-byte delimiters.
fn delimiter_byte(delimiter: char) -> u8 {
    u8::try_from(delimiter).unwrap_or(b';')
}

/// Zip a row with the headers. Missing trailing values become `""`, extra
/// values are dropped.
fn build_record(headers: &[String], values: Vec<String>) -> Value {
    let mut values = values.into_iter();
    let obj: Map<String, Value> = headers
        .iter()
        .map(|header| (header.clone(), Value::String(values.next().unwrap_or_default())))
        .collect();
    Value::Object(obj)
}
