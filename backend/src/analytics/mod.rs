//! Dashboard data model: load-once dataset, filters, KPIs and series.
//!
//! [`Dataset::load`] reads a cleaned extract once and returns an immutable
//! handle; callers hold and pass it explicitly (the server shares it as
//! `Arc<Dataset>`). There is no implicit session cache.
//!
//! Column discovery is a documented best-effort heuristic: the date column
//! is the first whose name contains `date`; the amount column is `amount`
//! when present, otherwise the first name containing `amount`, `value` or
//! `price`. No match is fatal - without those columns nothing meaningful
//! can be aggregated, so loading halts with a [`DatasetError`].

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{DatasetError, DatasetResult};
use crate::normalize::{sanitize_date, sanitize_numeric};
use crate::parser::{parse_bytes_auto, parse_file_auto, ParseResult};

/// Column holding the English area name, when the extract has one.
const AREA_COLUMN: &str = "area_name_en";

/// Column holding the English property type, when the extract has one.
const PROPERTY_TYPE_COLUMN: &str = "property_type_en";

// =============================================================================
// Rows and dataset handle
// =============================================================================

/// One transaction as the dashboard sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct TxRow {
    pub date: NaiveDate,
    pub year: i32,
    /// Month bucket, `YYYY-MM`.
    pub month: String,
    pub amount: f64,
    pub area: Option<String>,
    pub property_type: Option<String>,
}

/// An immutable, fully loaded dashboard dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<TxRow>,
    /// Detected date column name.
    pub date_column: String,
    /// Detected amount column name.
    pub amount_column: String,
}

impl Dataset {
    /// Load a cleaned extract from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> DatasetResult<Self> {
        Self::from_parse(parse_file_auto(path)?)
    }

    /// Load a cleaned extract from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> DatasetResult<Self> {
        Self::from_parse(parse_bytes_auto(bytes)?)
    }

    fn from_parse(parse: ParseResult) -> DatasetResult<Self> {
        let date_column = parse
            .headers
            .iter()
            .find(|c| c.contains("date"))
            .cloned()
            .ok_or(DatasetError::NoDateColumn)?;

        let amount_column = find_amount_column(&parse.headers)
            .ok_or(DatasetError::NoAmountColumn)?;

        let mut rows = Vec::with_capacity(parse.records.len());
        for record in &parse.records {
            let text = |col: &str| record.get(col).and_then(|v| v.as_str()).unwrap_or("");

            // Rows missing either required field are dropped, not repaired.
            let (date, amount) = match (
                sanitize_date(text(&date_column)),
                sanitize_numeric(text(&amount_column)),
            ) {
                (Some(d), Some(a)) => (d, a),
                _ => continue,
            };

            let optional = |col: &str| {
                let v = text(col);
                (!v.is_empty()).then(|| v.to_string())
            };

            rows.push(TxRow {
                date,
                year: date.year(),
                month: format!("{:04}-{:02}", date.year(), date.month()),
                amount,
                area: optional(AREA_COLUMN),
                property_type: optional(PROPERTY_TYPE_COLUMN),
            });
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Self {
            rows,
            date_column,
            amount_column,
        })
    }

    pub fn rows(&self) -> &[TxRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching a filter selection, in load order.
    pub fn filter(&self, selection: &FilterSelection) -> Vec<&TxRow> {
        self.rows.iter().filter(|r| selection.matches(r)).collect()
    }

    /// Distinct filter values for the sidebar, sorted.
    pub fn filter_options(&self) -> FilterOptions {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();

        let mut areas: Vec<String> = self.rows.iter().filter_map(|r| r.area.clone()).collect();
        areas.sort();
        areas.dedup();

        let mut property_types: Vec<String> = self
            .rows
            .iter()
            .filter_map(|r| r.property_type.clone())
            .collect();
        property_types.sort();
        property_types.dedup();

        FilterOptions {
            years,
            areas,
            property_types,
        }
    }
}

/// Amount column heuristic: exact `amount` first, then substring match.
fn find_amount_column(headers: &[String]) -> Option<String> {
    if let Some(exact) = headers.iter().find(|c| c.as_str() == "amount") {
        return Some(exact.clone());
    }
    headers
        .iter()
        .find(|c| ["amount", "value", "price"].iter().any(|k| c.contains(k)))
        .cloned()
}

// =============================================================================
// Filters
// =============================================================================

/// A sidebar selection. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub years: Vec<i32>,
    pub areas: Vec<String>,
    pub property_types: Vec<String>,
}

impl FilterSelection {
    pub fn matches(&self, row: &TxRow) -> bool {
        let year_ok = self.years.is_empty() || self.years.contains(&row.year);
        let area_ok = self.areas.is_empty()
            || row.area.as_ref().is_some_and(|a| self.areas.contains(a));
        let type_ok = self.property_types.is_empty()
            || row
                .property_type
                .as_ref()
                .is_some_and(|t| self.property_types.contains(t));
        year_ok && area_ok && type_ok
    }
}

/// Distinct values available for each filter.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub areas: Vec<String>,
    pub property_types: Vec<String>,
}

// =============================================================================
// KPIs
// =============================================================================

/// One KPI with its current / previous period values.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub current: f64,
    pub previous: f64,
    pub yoy: Option<f64>,
}

impl Kpi {
    fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            yoy: yoy_change(current, previous),
        }
    }
}

/// The dashboard's headline figures for the latest year in view.
#[derive(Debug, Clone)]
pub struct KpiSummary {
    pub current_year: i32,
    pub previous_year: i32,
    pub transactions: Kpi,
    pub total_value: Kpi,
    pub average_value: Kpi,
}

/// Compute KPIs over a filtered view. `None` when the view is empty.
///
/// "Current" is the most recent year present; "previous" is the calendar
/// year before it, which may have no rows at all.
pub fn kpi_summary(rows: &[&TxRow]) -> Option<KpiSummary> {
    let current_year = rows.iter().map(|r| r.year).max()?;
    let previous_year = current_year - 1;

    let stats = |year: i32| {
        let mut count = 0usize;
        let mut sum = 0.0f64;
        for row in rows.iter().filter(|r| r.year == year) {
            count += 1;
            sum += row.amount;
        }
        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        (count as f64, sum, mean)
    };

    let (curr_count, curr_sum, curr_mean) = stats(current_year);
    let (prev_count, prev_sum, prev_mean) = stats(previous_year);

    Some(KpiSummary {
        current_year,
        previous_year,
        transactions: Kpi::new(curr_count, prev_count),
        total_value: Kpi::new(curr_sum, prev_sum),
        average_value: Kpi::new(curr_mean, prev_mean),
    })
}

/// Year-over-year percent change; `None` ("not applicable") when the
/// prior-period value is zero.
pub fn yoy_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Render a YoY change: `"10.0%"`, or `"N/A"` when not applicable.
pub fn format_yoy(change: Option<f64>) -> String {
    match change {
        Some(pct) => format!("{:.1}%", pct),
        None => "N/A".to_string(),
    }
}

/// Compact KPI value rendering: billions, millions, or grouped units.
pub fn format_compact(n: f64) -> String {
    let abs = n.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2} B", n / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2} M", n / 1_000_000.0)
    } else {
        group_thousands(n)
    }
}

fn group_thousands(n: f64) -> String {
    let rounded = n.round() as i64;
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

// =============================================================================
// Series
// =============================================================================

/// Total amount per month bucket, sorted chronologically.
pub fn monthly_totals(rows: &[&TxRow]) -> Vec<(String, f64)> {
    let mut buckets: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *buckets.entry(row.month.as_str()).or_insert(0.0) += row.amount;
    }
    buckets
        .into_iter()
        .map(|(month, total)| (month.to_string(), total))
        .collect()
}

/// Top `n` areas by total amount, descending. Rows without an area are
/// excluded.
pub fn top_areas(rows: &[&TxRow], n: usize) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        if let Some(area) = &row.area {
            *totals.entry(area.as_str()).or_insert(0.0) += row.amount;
        }
    }

    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(area, total)| (area.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

// =============================================================================
// Export
// =============================================================================

/// Render a filtered view as CSV for download.
pub fn export_csv(rows: &[&TxRow]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());

    // Writer errors over an in-memory buffer can only come from formatting,
    // which these typed fields cannot produce.
    let _ = writer.write_record([
        "instance_date",
        "year",
        "month",
        "amount",
        "area_name_en",
        "property_type_en",
    ]);
    for row in rows {
        let _ = writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.year.to_string(),
            row.month.clone(),
            row.amount.to_string(),
            row.area.clone().unwrap_or_default(),
            row.property_type.clone().unwrap_or_default(),
        ]);
    }

    writer
        .into_inner()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CLEANED: &str = "\
instance_date,area_name_en,property_type_en,amount
2023-01-15,Marina,Unit,1000000
2023-02-20,Marina,Unit,2000000
2023-03-10,Deira,Land,500000
2024-01-05,Marina,Unit,1500000
2024-06-30,Jumeirah,Villa,3000000
";

    fn dataset() -> Dataset {
        Dataset::from_bytes(CLEANED.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_detects_columns() {
        let ds = dataset();
        assert_eq!(ds.date_column, "instance_date");
        assert_eq!(ds.amount_column, "amount");
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn test_amount_detection_prefers_exact_name() {
        let headers = vec![
            "rent_value".to_string(),
            "meter_sale_price".to_string(),
            "amount".to_string(),
        ];
        assert_eq!(find_amount_column(&headers), Some("amount".to_string()));

        // Fallback to the first substring match
        let headers = vec!["txn_value".to_string(), "unit_price".to_string()];
        assert_eq!(find_amount_column(&headers), Some("txn_value".to_string()));
    }

    #[test]
    fn test_missing_date_column_is_fatal() {
        let csv = "area,amount\nMarina,100";
        let err = Dataset::from_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::NoDateColumn));
    }

    #[test]
    fn test_missing_amount_column_is_fatal() {
        let csv = "instance_date,area\n2023-01-01,Marina";
        let err = Dataset::from_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::NoAmountColumn));
    }

    #[test]
    fn test_invalid_rows_dropped_on_load() {
        let csv = "instance_date,amount\n2023-01-01,100\nbad-date,200\n2023-02-01,\n";
        let ds = Dataset::from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_filter_selection() {
        let ds = dataset();

        let all = ds.filter(&FilterSelection::default());
        assert_eq!(all.len(), 5);

        let year = ds.filter(&FilterSelection {
            years: vec![2024],
            ..Default::default()
        });
        assert_eq!(year.len(), 2);

        let combined = ds.filter(&FilterSelection {
            years: vec![2024],
            areas: vec!["Marina".to_string()],
            ..Default::default()
        });
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].amount, 1_500_000.0);
    }

    #[test]
    fn test_filter_options_sorted_distinct() {
        let opts = dataset().filter_options();
        assert_eq!(opts.years, vec![2023, 2024]);
        assert_eq!(opts.areas, vec!["Deira", "Jumeirah", "Marina"]);
        assert_eq!(opts.property_types, vec!["Land", "Unit", "Villa"]);
    }

    #[test]
    fn test_kpi_summary_current_vs_previous() {
        let ds = dataset();
        let rows = ds.filter(&FilterSelection::default());
        let kpis = kpi_summary(&rows).unwrap();

        assert_eq!(kpis.current_year, 2024);
        assert_eq!(kpis.previous_year, 2023);
        assert_eq!(kpis.transactions.current, 2.0);
        assert_eq!(kpis.transactions.previous, 3.0);
        assert_eq!(kpis.total_value.current, 4_500_000.0);
        assert_eq!(kpis.total_value.previous, 3_500_000.0);
        assert_eq!(kpis.average_value.current, 2_250_000.0);
    }

    #[test]
    fn test_kpi_summary_empty_view() {
        assert!(kpi_summary(&[]).is_none());
    }

    #[test]
    fn test_yoy_change() {
        // Prior period zero: not applicable, never a division
        assert_eq!(yoy_change(0.0, 0.0), None);
        assert_eq!(yoy_change(100.0, 0.0), None);
        assert_eq!(format_yoy(None), "N/A");

        assert_eq!(format_yoy(yoy_change(110.0, 100.0)), "10.0%");
        assert_eq!(format_yoy(yoy_change(90.0, 100.0)), "-10.0%");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(2_500_000_000.0), "2.50 B");
        assert_eq!(format_compact(1_234_567.0), "1.23 M");
        assert_eq!(format_compact(999_999.0), "999,999");
        assert_eq!(format_compact(512.0), "512");
        assert_eq!(format_compact(-1_500.0), "-1,500");
    }

    #[test]
    fn test_monthly_totals_sorted() {
        let ds = dataset();
        let rows = ds.filter(&FilterSelection::default());
        let monthly = monthly_totals(&rows);

        assert_eq!(monthly.len(), 5);
        assert_eq!(monthly[0], ("2023-01".to_string(), 1_000_000.0));
        assert_eq!(monthly[4], ("2024-06".to_string(), 3_000_000.0));
    }

    #[test]
    fn test_top_areas_ranked() {
        let ds = dataset();
        let rows = ds.filter(&FilterSelection::default());
        let top = top_areas(&rows, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "Marina");
        assert_eq!(top[0].1, 4_500_000.0);
        assert_eq!(top[1].0, "Jumeirah");
    }

    #[test]
    fn test_export_csv_has_header_and_rows() {
        let ds = dataset();
        let rows = ds.filter(&FilterSelection {
            years: vec![2024],
            ..Default::default()
        });
        let csv = export_csv(&rows);

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "instance_date,year,month,amount,area_name_en,property_type_en"
        );
        assert_eq!(csv.lines().count(), 3);
    }
}
