//! Error types for the cleaning pipeline and dashboard.
//!
//! Per-field parse failures are *not* errors anywhere in this crate: a
//! numeric or date value that fails to parse becomes a missing value and the
//! row either survives or is dropped by the validity filter. The types below
//! cover the boundary conditions that genuinely stop processing:
//!
//! - [`DatasetError`] - dashboard dataset loading (missing columns are fatal)
//! - [`PipelineError`] - batch cleaning orchestration
//! - [`ServerError`] - HTTP server failures
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::parser::CsvError;

// =============================================================================
// Dataset Errors (dashboard load)
// =============================================================================

/// Errors while loading a cleaned extract into a dashboard [`crate::analytics::Dataset`].
#[derive(Debug, Error)]
pub enum DatasetError {
    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// No column name contains "date".
    ///
    /// Without a date column no period grouping is possible, so the
    /// dashboard must halt rather than guess.
    #[error("No date column found (expected a column name containing 'date')")]
    NoDateColumn,

    /// No column name matches the amount heuristics.
    #[error("No amount column found (expected 'amount' or a name containing 'value'/'price')")]
    NoAmountColumn,

    /// The file parsed but every row was dropped.
    #[error("Dataset is empty after dropping invalid rows")]
    Empty,
}

// =============================================================================
// Pipeline Errors (batch cleaning)
// =============================================================================

/// Errors during batch cleaning of a raw extract.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Failed to read input or write output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Write(#[from] csv::Error),

    /// Input contained headers but no data rows.
    #[error("No records to clean")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset loading.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::new(1, "Empty CSV file");
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("Empty"));

        // PipelineError -> ServerError
        let server_err: ServerError = PipelineError::EmptyInput.into();
        assert!(server_err.to_string().contains("No records"));
    }

    #[test]
    fn test_missing_column_messages() {
        assert!(DatasetError::NoDateColumn.to_string().contains("date"));
        assert!(DatasetError::NoAmountColumn.to_string().contains("amount"));
    }
}
