//! Quick diagnostics for a raw extract before cleaning it.
//!
//! Answers the questions you ask a new export: what columns are there, what
//! do the first rows look like, how much of each column actually parses as
//! a number or a date, and what raw values does a suspicious column hold.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::PipelineResult;
use crate::normalize::{sanitize_date, sanitize_numeric};
use crate::parser::parse_file_auto;

/// Parse behavior of one column across the whole extract.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    /// Cells with any text at all.
    pub non_empty: usize,
    /// Cells that sanitize to a number.
    pub numeric: usize,
    /// Cells that sanitize to a date.
    pub dates: usize,
}

/// Everything the `inspect` command reports.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub encoding: String,
    pub delimiter: char,
    pub row_count: usize,
    pub headers: Vec<String>,
    /// First N rows, raw text, in column order.
    pub head: Vec<Vec<String>>,
    pub columns: Vec<ColumnProfile>,
    /// Distinct raw values of the requested column, if any.
    pub samples: Option<(String, Vec<String>)>,
}

/// Inspect a raw extract.
///
/// `sample_column` selects one column to list distinct raw values for
/// (capped at `sample_limit`), the way you would eyeball `actual_worth`
/// to find the `"null"` tokens and thousands separators.
pub fn inspect_path<P: AsRef<Path>>(
    path: P,
    head_rows: usize,
    sample_column: Option<&str>,
    sample_limit: usize,
) -> PipelineResult<InspectReport> {
    let parse = parse_file_auto(path)?;

    let text = |record: &serde_json::Value, col: &str| -> String {
        record
            .get(col)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    let head = parse
        .records
        .iter()
        .take(head_rows)
        .map(|r| parse.headers.iter().map(|h| text(r, h)).collect())
        .collect();

    let columns = parse
        .headers
        .iter()
        .map(|header| {
            let mut profile = ColumnProfile {
                name: header.clone(),
                non_empty: 0,
                numeric: 0,
                dates: 0,
            };
            for record in &parse.records {
                let value = text(record, header);
                if value.trim().is_empty() {
                    continue;
                }
                profile.non_empty += 1;
                if sanitize_numeric(&value).is_some() {
                    profile.numeric += 1;
                }
                if sanitize_date(&value).is_some() {
                    profile.dates += 1;
                }
            }
            profile
        })
        .collect();

    let samples = sample_column.map(|column| {
        let column = column.trim().to_lowercase();
        let mut seen = BTreeSet::new();
        for record in &parse.records {
            if seen.len() >= sample_limit {
                break;
            }
            seen.insert(text(record, &column));
        }
        (column, seen.into_iter().collect())
    });

    Ok(InspectReport {
        encoding: parse.encoding,
        delimiter: parse.delimiter,
        row_count: parse.records.len(),
        headers: parse.headers,
        head,
        columns,
        samples,
    })
}
