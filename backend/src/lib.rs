//! # dldash - DLD transaction cleaning and dashboard
//!
//! dldash ingests raw DLD real-estate transaction extracts (CSV), cleans and
//! derives fields, and serves an interactive filterable dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Raw CSV    │────▶│   Parser    │────▶│  Normalize  │────▶│  Clean CSV  │
//! │ (any enc.)  │     │ (auto-enc)  │     │ (amount +   │     │ (+ amount)  │
//! └─────────────┘     └─────────────┘     │  filter)    │     └──────┬──────┘
//!                                         └─────────────┘            │
//!                                                              ┌─────▼──────┐
//!                                                              │ Analytics  │
//!                                                              │ (KPIs, API)│
//!                                                              └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dldash::{clean_to_file, CleanOptions};
//! use std::path::Path;
//!
//! let summary = clean_to_file(
//!     Path::new("DLD_TRANSACTIONS_OPEN.csv"),
//!     Path::new("DLD_CLEAN.csv"),
//!     &CleanOptions::default(),
//! )?;
//! println!("kept {} rows, dropped {}", summary.kept, summary.dropped);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`parser`] - CSV parsing with auto-detection
//! - [`normalize`] - Field sanitizers, amount derivation, validity filter
//! - [`pipeline`] - Batch cleaning driver (whole-file and chunked)
//! - [`writer`] - Header-once CSV output
//! - [`analytics`] - Dashboard dataset, filters, KPIs, series
//! - [`inspect`] - Raw extract diagnostics
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod normalize;

// Parsing
pub mod parser;

// Cleaning
pub mod pipeline;
pub mod writer;

// Dashboard
pub mod analytics;

// Diagnostics
pub mod inspect;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{DatasetError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Normalizer
// =============================================================================

pub use normalize::{
    derive_amount,
    is_valid,
    normalize_row,
    normalize_rows,
    sanitize_date,
    sanitize_numeric,
    NormalizedRecord,
    NormalizeOutcome,
    AMOUNT_COLUMN,
    AMOUNT_RULES,
    DATE_COLUMN,
    NUMERIC_COLUMNS,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    detect_delimiter,
    detect_encoding,
    parse_bytes,
    parse_bytes_auto,
    parse_file_auto,
    parse_str,
    CsvError,
    ParseResult,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    clean_bytes,
    clean_path,
    clean_to_file,
    CleanOptions,
    CleanResult,
    CleanSummary,
    CsvInfo,
    DEFAULT_CHUNK_SIZE,
};

pub use writer::CleanWriter;

// =============================================================================
// Re-exports - Analytics
// =============================================================================

pub use analytics::{
    export_csv,
    format_compact,
    format_yoy,
    kpi_summary,
    monthly_totals,
    top_areas,
    yoy_change,
    Dataset,
    FilterOptions,
    FilterSelection,
    Kpi,
    KpiSummary,
    TxRow,
};

// =============================================================================
// Re-exports - Inspection
// =============================================================================

pub use inspect::{inspect_path, ColumnProfile, InspectReport};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    error_response,
    CsvMetadata,
    DashboardResponse,
    FiltersResponse,
    KpiCard,
    SeriesPoint,
    UploadResponse,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
