//! Delimited-text ingestion with encoding and delimiter auto-detection.
//!
//! Raw DLD extracts arrive with inconsistent encodings, separators and
//! header casing. This module converts them into JSON objects keyed by
//! *normalized* column names (trimmed, unquoted, lowercased) so that the
//! rest of the pipeline can address `procedure_area`, `instance_date` etc.
//! without caring how the export tool spelled them.
//!
//! Quoting matters here: monetary cells like `"1,200,000"` embed the
//! delimiter, so rows are parsed with the `csv` crate rather than a line
//! split. All values stay as free text at this stage; numeric and date
//! coercion happens in [`crate::normalize`].

use serde_json::{json, Map, Value};
use std::path::Path;

/// CSV parsing error with context
#[derive(Debug, Clone)]
pub struct CsvError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records as JSON objects keyed by normalized header
    pub records: Vec<Value>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Normalized column headers, in file order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        // UTF-8, ASCII and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
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

/// Normalize a header cell: trim, strip stray quotes, lowercase.
///
/// `" Instance_Date "` and `instance_date` address the same column.
fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_lowercase()
}

/// Parse CSV text with an explicit delimiter.
///
/// Each row becomes a JSON object where keys are normalized column headers.
/// Short rows are padded with empty strings; extra cells are ignored.
///
/// # Example
/// ```ignore
/// use dldash::parse_str;
///
/// let csv = "Instance_Date,Actual_Worth\n01/03/2024,\"1,200,000\"";
/// let result = parse_str(csv, ',').unwrap();
///
/// assert_eq!(result.headers, vec!["instance_date", "actual_worth"]);
/// assert_eq!(result.records[0]["actual_worth"], "1,200,000");
/// ```
pub fn parse_str(content: &str, delimiter: char) -> Result<ParseResult, CsvError> {
    parse_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, CsvError> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|e| CsvError::new(0, format!("Cannot read file: {}", e)))?;

    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    parse_bytes(bytes, None)
}

/// Parse CSV bytes, auto-detecting encoding and (unless given) the delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> Result<ParseResult, CsvError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    parse_with_metadata(&content, delimiter, encoding)
}

fn parse_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> Result<ParseResult, CsvError> {
    if content.trim().is_empty() {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    // The csv crate takes a single-byte delimiter; anything wider would
    // silently truncate.
    if !delimiter.is_ascii() {
        return Err(CsvError::new(
            1,
            format!("Delimiter '{}' is not a single ASCII character", delimiter),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::new(1, format!("Cannot read header: {}", e)))?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::new(1, "No headers found"));
    }

    let mut records = Vec::new();

    for (idx, row) in reader.records().enumerate() {
        // +1 for 0-index, +1 for header
        let line_num = idx + 2;
        let row = row.map_err(|e| CsvError::new(line_num, format!("Cannot read line: {}", e)))?;

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let raw_value = row.get(i).map(str::trim).unwrap_or("");
            obj.insert(header.clone(), json!(raw_value));
        }

        records.push(Value::Object(obj));
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "instance_date,actual_worth\n01/03/2024,500000\n15/06/2024,750000";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["instance_date"], "01/03/2024");
        assert_eq!(result.records[0]["actual_worth"], "500000");
        assert_eq!(result.records[1]["actual_worth"], "750000");
    }

    #[test]
    fn test_headers_are_normalized() {
        let csv = " Instance_Date ;\"Actual_Worth\";AREA_NAME_EN\n01/03/2024;500000;Marina";
        let result = parse_str(csv, ';').unwrap();

        assert_eq!(result.headers, vec!["instance_date", "actual_worth", "area_name_en"]);
        assert_eq!(result.records[0]["area_name_en"], "Marina");
    }

    #[test]
    fn test_quoted_delimiter_kept_in_value() {
        // Thousands separators inside a quoted cell must not split the row
        let csv = "area,worth\nMarina,\"1,200,000\"";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0]["worth"], "1,200,000");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "a,b,c\n1,,3\n1";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.records[0]["b"], "");
        assert_eq!(result.records[1]["b"], "");
        assert_eq!(result.records[1]["c"], "");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "a,b\n1,2,3,4";
        let result = parse_str(csv, ',').unwrap();

        assert_eq!(result.records[0]["a"], "1");
        assert_eq!(result.records[0]["b"], "2");
    }

    #[test]
    fn test_empty_csv_error() {
        let result = parse_str("", ',');
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.message.contains("Empty"));
    }

    #[test]
    fn test_error_message_format() {
        let err = CsvError::new(5, "Invalid value")
            .with_column("actual_worth")
            .with_value("abc");

        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'actual_worth'"));
        assert!(msg.contains("value 'abc'"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "instance_date;actual_worth\n01/03/2024;500000";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.headers, vec!["instance_date", "actual_worth"]);
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        // More semicolons than commas, but the caller knows better.
        let csv = "a,b\n1;2;3,4";
        let result = parse_bytes(csv.as_bytes(), Some(',')).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.records[0]["a"], "1;2;3");
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let csv = "a—b\n1—2";
        let err = parse_bytes(csv.as_bytes(), Some('—')).unwrap_err();
        assert!(err.message.contains("ASCII"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert!(decoded.contains("Soci"));
    }
}
