//! Header-once CSV output for cleaned records.
//!
//! Cleaned output keeps the input columns (normalized headers, sanitized
//! values) and appends the derived `amount` column last. When the pipeline
//! writes chunk by chunk, the header row is emitted only for the first
//! batch, so an output assembled from many chunks is indistinguishable from
//! a single-pass write.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::PipelineResult;
use crate::normalize::{NormalizedRecord, AMOUNT_COLUMN, DATE_COLUMN, NUMERIC_COLUMNS};

/// Appends cleaned records to a CSV destination, writing the header once.
pub struct CleanWriter<W: Write> {
    writer: csv::Writer<W>,
    /// Input column order; the derived amount column is appended last.
    columns: Vec<String>,
    header_written: bool,
}

impl CleanWriter<File> {
    /// Create a writer over a new output file.
    pub fn create<P: AsRef<Path>>(path: P, columns: &[String]) -> PipelineResult<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file, columns))
    }
}

impl<W: Write> CleanWriter<W> {
    /// Wrap an arbitrary writer.
    pub fn from_writer(inner: W, columns: &[String]) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            columns: columns.to_vec(),
            header_written: false,
        }
    }

    /// Append a batch of records, emitting the header if this is the first.
    pub fn write_batch(&mut self, records: &[NormalizedRecord]) -> PipelineResult<()> {
        if !self.header_written {
            let mut header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
            header.push(AMOUNT_COLUMN);
            self.writer.write_record(&header)?;
            self.header_written = true;
        }

        for record in records {
            let mut row: Vec<String> = self
                .columns
                .iter()
                .map(|column| render_field(record, column))
                .collect();
            row.push(render_amount(record));
            self.writer.write_record(&row)?;
        }

        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn finish(self) -> PipelineResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}

/// Render one input column of a record. Missing values render empty.
fn render_field(record: &NormalizedRecord, column: &str) -> String {
    match column {
        DATE_COLUMN => record
            .instance_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        col if NUMERIC_COLUMNS.contains(&col) => record
            .numeric_field(col)
            .map(|n| n.to_string())
            .unwrap_or_default(),
        other => record.extra.get(other).cloned().unwrap_or_default(),
    }
}

fn render_amount(record: &NormalizedRecord) -> String {
    record.amount.map(|n| n.to_string()).unwrap_or_default()
}
