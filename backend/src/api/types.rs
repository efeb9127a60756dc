//! REST API types for the dashboard frontend.
//!
//! Everything serializes camelCase; the frontend mirrors these shapes in
//! its own `types` module.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::analytics::{format_compact, format_yoy, FilterOptions, Kpi, KpiSummary};
use crate::pipeline::{format_delimiter, CleanResult, CsvInfo};

// =============================================================================
// Dashboard payload
// =============================================================================

/// Full dashboard payload for one filter selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Rows in the filtered view.
    pub row_count: usize,

    /// Latest year in view; `None` when the view is empty.
    pub current_year: Option<i32>,

    /// The comparison year.
    pub previous_year: Option<i32>,

    /// Headline cards (count, total, mean), empty when the view is empty.
    pub kpis: Vec<KpiCard>,

    /// Monthly transaction value, chronological.
    pub monthly: Vec<SeriesPoint>,

    /// Top areas by transaction value, descending.
    pub top_areas: Vec<SeriesPoint>,
}

/// One KPI card, pre-formatted for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCard {
    pub title: String,
    /// Compact display value ("1.23 M").
    pub value: String,
    /// YoY delta ("10.0%" or "N/A").
    pub yoy: String,
    /// Unformatted current value.
    pub raw: f64,
}

impl KpiCard {
    fn new(title: &str, kpi: &Kpi) -> Self {
        Self {
            title: title.to_string(),
            value: format_compact(kpi.current),
            yoy: format_yoy(kpi.yoy),
            raw: kpi.current,
        }
    }
}

/// Build the three headline cards from a KPI summary.
pub fn kpi_cards(summary: &KpiSummary) -> Vec<KpiCard> {
    vec![
        KpiCard::new("Total Transactions", &summary.transactions),
        KpiCard::new("Total Value (AED)", &summary.total_value),
        KpiCard::new("Average Value (AED)", &summary.average_value),
    ]
}

/// One labeled point of a chart series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl From<(String, f64)> for SeriesPoint {
    fn from((label, value): (String, f64)) -> Self {
        Self { label, value }
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Distinct values available for the sidebar filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersResponse {
    pub years: Vec<i32>,
    pub areas: Vec<String>,
    pub property_types: Vec<String>,
}

impl From<FilterOptions> for FiltersResponse {
    fn from(options: FilterOptions) -> Self {
        Self {
            years: options.years,
            areas: options.areas,
            property_types: options.property_types,
        }
    }
}

// =============================================================================
// Upload
// =============================================================================

/// Response after cleaning an uploaded raw extract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" when nothing was dropped, "warning" otherwise
    pub status: String,

    /// Rows that survived the validity filter
    pub kept: usize,

    /// Rows dropped for missing amount or date
    pub dropped: usize,

    /// Input metadata
    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<&CsvInfo> for CsvMetadata {
    fn from(info: &CsvInfo) -> Self {
        Self {
            encoding: info.encoding.clone(),
            delimiter: format_delimiter(info.delimiter),
            row_count: info.row_count,
            columns: info.headers.clone(),
        }
    }
}

impl From<CleanResult> for UploadResponse {
    fn from(result: CleanResult) -> Self {
        let status = if result.dropped == 0 { "ready" } else { "warning" };
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            kept: result.kept(),
            dropped: result.dropped,
            csv_info: CsvMetadata::from(&result.csv_info),
        }
    }
}

/// Standard error body.
pub fn error_response(message: &str) -> Value {
    json!({
        "status": "error",
        "error": message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{kpi_summary, Dataset, FilterSelection};

    #[test]
    fn test_kpi_cards_formatting() {
        let csv = "\
instance_date,amount
2023-05-01,1000000
2024-05-01,1100000
";
        let ds = Dataset::from_bytes(csv.as_bytes()).unwrap();
        let rows = ds.filter(&FilterSelection::default());
        let cards = kpi_cards(&kpi_summary(&rows).unwrap());

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "Total Transactions");
        assert_eq!(cards[0].yoy, "0.0%");
        assert_eq!(cards[1].value, "1.10 M");
        assert_eq!(cards[1].yoy, "10.0%");
    }

    #[test]
    fn test_upload_response_serializes_camel_case() {
        let response = UploadResponse {
            job_id: "job".to_string(),
            status: "warning".to_string(),
            kept: 10,
            dropped: 2,
            csv_info: CsvMetadata {
                encoding: "utf-8".to_string(),
                delimiter: ",".to_string(),
                row_count: 12,
                columns: vec!["instance_date".to_string()],
            },
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"jobId\""));
        assert!(json.contains("\"csvInfo\""));
        assert!(json.contains("\"rowCount\":12"));
    }
}
