//! Batch cleaning driver: parse, normalize, filter, write.
//!
//! Two entry points mirror the two ways the extract is consumed:
//!
//! - [`clean_bytes`] / [`clean_path`] - one pass in memory, returning the
//!   kept records (used by the upload endpoint and the `summary` command).
//! - [`clean_to_file`] - chunked cleaning for large extracts, appending to
//!   the output file batch by batch with the header written exactly once.
//!
//! Because every record is normalized independently, chunk boundaries never
//! change the result: any chunking produces the same kept-row set and the
//! same derived amounts as a single pass.

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::normalize::{normalize_rows, NormalizedRecord};
use crate::parser::{parse_bytes, ParseResult};
use crate::writer::CleanWriter;

/// Default rows per chunk for file-to-file cleaning.
pub const DEFAULT_CHUNK_SIZE: usize = 200_000;

/// Options for a cleaning run.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Explicit delimiter; auto-detected when `None`.
    pub delimiter: Option<char>,

    /// Rows per output batch for [`clean_to_file`]; `None` means
    /// [`DEFAULT_CHUNK_SIZE`].
    pub chunk_size: Option<usize>,
}

/// Input file metadata from the parse step.
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl CsvInfo {
    fn from_parse(parse: &ParseResult) -> Self {
        Self {
            encoding: parse.encoding.clone(),
            delimiter: parse.delimiter,
            headers: parse.headers.clone(),
            row_count: parse.records.len(),
        }
    }
}

/// Result of an in-memory cleaning run.
#[derive(Debug, Clone)]
pub struct CleanResult {
    /// Records that passed the validity filter, in input order.
    pub records: Vec<NormalizedRecord>,
    /// Rows dropped for missing amount or date.
    pub dropped: usize,
    /// Input metadata.
    pub csv_info: CsvInfo,
}

impl CleanResult {
    pub fn kept(&self) -> usize {
        self.records.len()
    }
}

/// Summary of a file-to-file cleaning run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub kept: usize,
    pub dropped: usize,
    pub chunks: usize,
    pub csv_info: CsvInfo,
}

/// Clean a raw extract in memory.
pub fn clean_path<P: AsRef<Path>>(path: P, options: &CleanOptions) -> PipelineResult<CleanResult> {
    let bytes = std::fs::read(path.as_ref())?;
    clean_bytes(&bytes, options)
}

/// Clean raw extract bytes in memory.
pub fn clean_bytes(bytes: &[u8], options: &CleanOptions) -> PipelineResult<CleanResult> {
    let parse = parse_input(bytes, options)?;
    let csv_info = CsvInfo::from_parse(&parse);

    let outcome = normalize_rows(&parse.records);
    log_cleaning(outcome.kept.len(), outcome.dropped);

    Ok(CleanResult {
        records: outcome.kept,
        dropped: outcome.dropped,
        csv_info,
    })
}

/// Clean a raw extract into an output file, chunk by chunk.
///
/// The output header is written once, for the first chunk only, so the file
/// is valid CSV no matter how many batches it took.
pub fn clean_to_file(
    input: &Path,
    output: &Path,
    options: &CleanOptions,
) -> PipelineResult<CleanSummary> {
    let bytes = std::fs::read(input)?;
    let parse = parse_input(&bytes, options)?;
    let csv_info = CsvInfo::from_parse(&parse);
    let chunk_size = options.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);

    log_info(format!(
        "Cleaning {} rows in chunks of {}",
        parse.records.len(),
        chunk_size
    ));

    let mut writer = CleanWriter::create(output, &parse.headers)?;
    let mut kept = 0;
    let mut dropped = 0;
    let mut chunks = 0;

    for chunk in parse.records.chunks(chunk_size) {
        let outcome = normalize_rows(chunk);
        writer.write_batch(&outcome.kept)?;
        kept += outcome.kept.len();
        dropped += outcome.dropped;
        chunks += 1;
        log_info(format!("Processed chunk {} ({} rows)", chunks, chunk.len()));
    }

    writer.finish()?;
    log_cleaning(kept, dropped);
    log_success(format!("Clean file saved to {}", output.display()));

    Ok(CleanSummary {
        kept,
        dropped,
        chunks,
        csv_info,
    })
}

fn parse_input(bytes: &[u8], options: &CleanOptions) -> PipelineResult<ParseResult> {
    let parse = parse_bytes(bytes, options.delimiter)?;

    log_info(format!("Detected encoding: {}", parse.encoding));
    log_info(format!(
        "Detected separator: '{}'",
        format_delimiter(parse.delimiter)
    ));
    log_info(format!("Read {} rows", parse.records.len()));

    if parse.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(parse)
}

fn log_cleaning(kept: usize, dropped: usize) {
    if dropped > 0 {
        log_warning(format!(
            "Dropped {} rows with missing amount or date",
            dropped
        ));
    }
    log_success(format!("Kept {} rows", kept));
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
instance_date,procedure_area,actual_worth,meter_sale_price,rent_value,meter_rent_price,area_name_en
01/03/2021,50,\"1,200,000\",3000,,12.5,Marina
02/03/2021,50,,3000,,12.5,Deira
03/03/2021,,,,20000,,Jumeirah
garbage,50,100000,,,,Marina
04/03/2021,,null,,,,Deira
";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_clean_bytes_keeps_and_drops() {
        let result = clean_bytes(SAMPLE.as_bytes(), &CleanOptions::default()).unwrap();

        // Rows 1-3 are valid; row 4 has a bad date, row 5 has no amount source.
        assert_eq!(result.kept(), 3);
        assert_eq!(result.dropped, 2);
        assert_eq!(result.records[0].amount, Some(1_200_000.0));
        assert_eq!(result.records[1].amount, Some(150_000.0));
        assert_eq!(result.records[2].amount, Some(20_000.0));
        assert_eq!(result.csv_info.row_count, 5);
    }

    #[test]
    fn test_clean_bytes_empty_input() {
        let result = clean_bytes(b"instance_date,actual_worth\n", &CleanOptions::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn test_chunked_output_matches_single_pass() {
        let input = write_temp(SAMPLE);
        let whole = NamedTempFile::new().unwrap();
        let chunked = NamedTempFile::new().unwrap();

        let single = clean_to_file(
            input.path(),
            whole.path(),
            &CleanOptions {
                chunk_size: Some(usize::MAX),
                ..Default::default()
            },
        )
        .unwrap();

        let split = clean_to_file(
            input.path(),
            chunked.path(),
            &CleanOptions {
                chunk_size: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(single.kept, split.kept);
        assert_eq!(single.dropped, split.dropped);
        assert_eq!(split.chunks, 5);

        // Byte-identical output regardless of chunking
        let a = std::fs::read_to_string(whole.path()).unwrap();
        let b = std::fs::read_to_string(chunked.path()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_chunked_output_has_single_header() {
        let input = write_temp(SAMPLE);
        let output = NamedTempFile::new().unwrap();

        clean_to_file(
            input.path(),
            output.path(),
            &CleanOptions {
                chunk_size: Some(2),
                ..Default::default()
            },
        )
        .unwrap();

        let content = std::fs::read_to_string(output.path()).unwrap();
        let headers = content
            .lines()
            .filter(|l| l.starts_with("instance_date"))
            .count();
        assert_eq!(headers, 1);
        // Header + 3 kept rows
        assert_eq!(content.lines().count(), 4);
    }
}
