//! Transaction normalizer: field sanitization, amount derivation, validity.
//!
//! This is the core of the repository. A raw row moves through four steps,
//! each a pure function of that row alone:
//!
//! ```text
//! Raw row ──▶ sanitize numeric fields ──▶ sanitize date ──▶ derive amount ──▶ keep | drop
//! ```
//!
//! The source extract mixes sale and rent transactions whose monetary value
//! lives in different columns. [`derive_amount`] reconciles them with a
//! fixed three-tier priority (see [`AMOUNT_RULES`]): prefer the reported
//! total, else reconstruct sale value from area × unit price, else fall back
//! to the reported rent.
//!
//! Parse failures are expected data quality, not faults: they become missing
//! values, and rows missing either the derived amount or the transaction
//! date are dropped by [`is_valid`] rather than repaired.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashMap;

// =============================================================================
// Column names
// =============================================================================

/// Numeric columns sanitized by the cleaner, in extract order.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "procedure_area",
    "actual_worth",
    "meter_sale_price",
    "rent_value",
    "meter_rent_price",
];

/// The transaction date column of the extract.
pub const DATE_COLUMN: &str = "instance_date";

/// Name of the derived column appended to cleaned output.
pub const AMOUNT_COLUMN: &str = "amount";

// =============================================================================
// Field Sanitizer
// =============================================================================

/// Coerce free-form numeric text to `f64`, or `None` when it cannot be.
///
/// Strips thousands-separator commas, removes the literal token `"null"`
/// (the extract writes it verbatim into numeric cells) and trims
/// surrounding whitespace before parsing. A value that is empty after
/// stripping is missing, never zero.
///
/// Interior spaces are left alone: `"1 200"` is unparseable and therefore
/// missing, matching the canonical cleaning behavior.
pub fn sanitize_numeric(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "").replace("null", "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Date Sanitizer
// =============================================================================

/// Day-first datetime formats seen in raw extracts, plus ISO for re-reading
/// cleaned output. Order matters: datetime forms before date-only forms.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
];

/// Coerce free-form date text to a calendar date, or `None`.
///
/// Ambiguous numeric dates are interpreted day-first: `"03/04/2021"` is
/// 3 April 2021, not March 4. Unparseable text yields `None`, not an error.
pub fn sanitize_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }

    None
}

// =============================================================================
// Normalized Record
// =============================================================================

/// A transaction row after numeric and date coercion.
///
/// The five value-bearing columns are typed; every other column of the
/// extract passes through untouched in `extra` so that cleaned output keeps
/// the full row (area names, property types, ... are what the dashboard
/// filters on).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRecord {
    pub instance_date: Option<NaiveDate>,
    pub procedure_area: Option<f64>,
    pub actual_worth: Option<f64>,
    pub meter_sale_price: Option<f64>,
    pub rent_value: Option<f64>,
    pub meter_rent_price: Option<f64>,
    /// Derived monetary value, see [`derive_amount`].
    pub amount: Option<f64>,
    /// Passthrough columns, keyed by normalized header.
    pub extra: HashMap<String, String>,
}

impl NormalizedRecord {
    /// Sanitized value of one of the [`NUMERIC_COLUMNS`], by name.
    pub fn numeric_field(&self, column: &str) -> Option<f64> {
        match column {
            "procedure_area" => self.procedure_area,
            "actual_worth" => self.actual_worth,
            "meter_sale_price" => self.meter_sale_price,
            "rent_value" => self.rent_value,
            "meter_rent_price" => self.meter_rent_price,
            _ => None,
        }
    }

    fn numeric_field_mut(&mut self, column: &str) -> Option<&mut Option<f64>> {
        match column {
            "procedure_area" => Some(&mut self.procedure_area),
            "actual_worth" => Some(&mut self.actual_worth),
            "meter_sale_price" => Some(&mut self.meter_sale_price),
            "rent_value" => Some(&mut self.rent_value),
            "meter_rent_price" => Some(&mut self.meter_rent_price),
            _ => None,
        }
    }
}

// =============================================================================
// Amount Deriver
// =============================================================================

/// One tier of the amount fallback priority.
pub struct AmountRule {
    /// Short name for diagnostics.
    pub name: &'static str,
    /// Returns the amount if this tier applies to the record.
    pub derive: fn(&NormalizedRecord) -> Option<f64>,
}

fn reported_worth(r: &NormalizedRecord) -> Option<f64> {
    r.actual_worth
}

fn area_times_unit_price(r: &NormalizedRecord) -> Option<f64> {
    Some(r.procedure_area? * r.meter_sale_price?)
}

fn reported_rent(r: &NormalizedRecord) -> Option<f64> {
    r.rent_value
}

/// The amount fallback tiers, in priority order.
///
/// Evaluated short-circuit: the first tier that yields a value wins, so the
/// tiers are mutually exclusive by construction. Kept as an explicit table
/// rather than nested conditionals so the priority is visible and testable
/// in isolation.
pub const AMOUNT_RULES: &[AmountRule] = &[
    AmountRule {
        name: "actual_worth",
        derive: reported_worth,
    },
    AmountRule {
        name: "area_x_meter_sale_price",
        derive: area_times_unit_price,
    },
    AmountRule {
        name: "rent_value",
        derive: reported_rent,
    },
];

/// Derive the monetary amount for a sanitized record.
///
/// Returns `None` when no tier applies; such records are later dropped.
pub fn derive_amount(record: &NormalizedRecord) -> Option<f64> {
    AMOUNT_RULES.iter().find_map(|rule| (rule.derive)(record))
}

// =============================================================================
// Validity Filter
// =============================================================================

/// A record survives into output iff both the derived amount and the
/// transaction date are present. Hard drop, no imputation.
pub fn is_valid(record: &NormalizedRecord) -> bool {
    record.amount.is_some() && record.instance_date.is_some()
}

// =============================================================================
// Row normalization
// =============================================================================

/// Normalize one parsed row: sanitize the typed columns, pass the rest
/// through, then derive the amount.
///
/// Pure function of the row alone - no cross-record state - so any chunking
/// of the input produces identical results.
pub fn normalize_row(row: &Value) -> NormalizedRecord {
    let mut record = NormalizedRecord::default();

    let obj = match row.as_object() {
        Some(obj) => obj,
        None => return record,
    };

    for (key, value) in obj {
        let text = value.as_str().unwrap_or("");

        match key.as_str() {
            DATE_COLUMN => record.instance_date = sanitize_date(text),
            col if NUMERIC_COLUMNS.contains(&col) => {
                if let Some(slot) = record.numeric_field_mut(col) {
                    *slot = sanitize_numeric(text);
                }
            }
            _ => {
                record.extra.insert(key.clone(), text.to_string());
            }
        }
    }

    record.amount = derive_amount(&record);
    record
}

/// Outcome of normalizing a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    /// Records that passed the validity filter, in input order.
    pub kept: Vec<NormalizedRecord>,
    /// Number of rows dropped for missing amount or date.
    pub dropped: usize,
}

/// Normalize a batch of parsed rows and apply the validity filter.
///
/// Output order preserves input order for kept rows.
pub fn normalize_rows(rows: &[Value]) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for row in rows {
        let record = normalize_row(row);
        if is_valid(&record) {
            outcome.kept.push(record);
        } else {
            outcome.dropped += 1;
        }
    }

    outcome
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_numeric_plain() {
        assert_eq!(sanitize_numeric("500000"), Some(500000.0));
        assert_eq!(sanitize_numeric("1234.56"), Some(1234.56));
        assert_eq!(sanitize_numeric("-42"), Some(-42.0));
    }

    #[test]
    fn test_sanitize_numeric_strips_commas() {
        // Same result as the separator-free equivalent
        assert_eq!(sanitize_numeric("1,200,000"), sanitize_numeric("1200000"));
        assert_eq!(sanitize_numeric("1,200,000"), Some(1200000.0));
    }

    #[test]
    fn test_sanitize_numeric_strips_null_token() {
        assert_eq!(sanitize_numeric("null"), None);
        assert_eq!(sanitize_numeric("  null "), None);
        // "null" glued to digits still leaves the digits
        assert_eq!(sanitize_numeric("null123"), Some(123.0));
    }

    #[test]
    fn test_sanitize_numeric_whitespace() {
        assert_eq!(sanitize_numeric("  750000  "), Some(750000.0));
        // Interior spaces are not stripped: unparseable, hence missing
        assert_eq!(sanitize_numeric("1 200"), None);
    }

    #[test]
    fn test_sanitize_numeric_garbage_is_missing_not_zero() {
        assert_eq!(sanitize_numeric(""), None);
        assert_eq!(sanitize_numeric("   "), None);
        assert_eq!(sanitize_numeric("abc"), None);
        assert_eq!(sanitize_numeric(","), None);
        assert_eq!(sanitize_numeric("NaN"), None);
        assert_eq!(sanitize_numeric("inf"), None);
    }

    #[test]
    fn test_sanitize_date_day_first() {
        // 3 April 2021, not March 4
        assert_eq!(
            sanitize_date("03/04/2021"),
            Some(NaiveDate::from_ymd_opt(2021, 4, 3).unwrap())
        );
        assert_eq!(
            sanitize_date("25-12-2020"),
            Some(NaiveDate::from_ymd_opt(2020, 12, 25).unwrap())
        );
    }

    #[test]
    fn test_sanitize_date_with_time_and_iso() {
        assert_eq!(
            sanitize_date("03/04/2021 14:30:00"),
            Some(NaiveDate::from_ymd_opt(2021, 4, 3).unwrap())
        );
        assert_eq!(
            sanitize_date("2021-04-03"),
            Some(NaiveDate::from_ymd_opt(2021, 4, 3).unwrap())
        );
    }

    #[test]
    fn test_sanitize_date_unparseable_is_missing() {
        assert_eq!(sanitize_date(""), None);
        assert_eq!(sanitize_date("null"), None);
        assert_eq!(sanitize_date("32/13/2021"), None);
        assert_eq!(sanitize_date("sometime in May"), None);
    }

    fn record(
        actual_worth: Option<f64>,
        procedure_area: Option<f64>,
        meter_sale_price: Option<f64>,
        rent_value: Option<f64>,
    ) -> NormalizedRecord {
        NormalizedRecord {
            actual_worth,
            procedure_area,
            meter_sale_price,
            rent_value,
            ..Default::default()
        }
    }

    #[test]
    fn test_amount_tier1_reported_worth_wins() {
        let r = record(Some(100_000.0), Some(50.0), Some(3000.0), Some(20_000.0));
        assert_eq!(derive_amount(&r), Some(100_000.0));
    }

    #[test]
    fn test_amount_tier2_area_times_unit_price() {
        let r = record(None, Some(50.0), Some(3000.0), Some(20_000.0));
        assert_eq!(derive_amount(&r), Some(150_000.0));
    }

    #[test]
    fn test_amount_tier2_needs_both_inputs() {
        let r = record(None, Some(50.0), None, Some(20_000.0));
        assert_eq!(derive_amount(&r), Some(20_000.0));
        let r = record(None, None, Some(3000.0), Some(20_000.0));
        assert_eq!(derive_amount(&r), Some(20_000.0));
    }

    #[test]
    fn test_amount_tier3_rent_fallback() {
        let r = record(None, None, None, Some(20_000.0));
        assert_eq!(derive_amount(&r), Some(20_000.0));
    }

    #[test]
    fn test_amount_all_tiers_missing() {
        let r = record(None, None, None, None);
        assert_eq!(derive_amount(&r), None);
    }

    #[test]
    fn test_amount_rule_order() {
        let names: Vec<_> = AMOUNT_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["actual_worth", "area_x_meter_sale_price", "rent_value"]
        );
    }

    #[test]
    fn test_validity_filter() {
        let mut r = record(Some(100.0), None, None, None);
        r.amount = derive_amount(&r);
        // Amount present, date missing -> dropped
        assert!(!is_valid(&r));

        r.instance_date = NaiveDate::from_ymd_opt(2021, 4, 3);
        assert!(is_valid(&r));

        // Date present, amount missing -> dropped
        let mut r = record(None, None, None, None);
        r.instance_date = NaiveDate::from_ymd_opt(2021, 4, 3);
        r.amount = derive_amount(&r);
        assert!(!is_valid(&r));
    }

    #[test]
    fn test_normalize_row_full() {
        let row = json!({
            "instance_date": "03/04/2021",
            "procedure_area": "50",
            "actual_worth": "null",
            "meter_sale_price": "3,000",
            "rent_value": "",
            "meter_rent_price": "12.5",
            "area_name_en": "Marina",
            "property_type_en": "Unit"
        });

        let record = normalize_row(&row);
        assert_eq!(record.instance_date, NaiveDate::from_ymd_opt(2021, 4, 3));
        assert_eq!(record.actual_worth, None);
        assert_eq!(record.meter_sale_price, Some(3000.0));
        assert_eq!(record.amount, Some(150_000.0));
        assert_eq!(record.extra["area_name_en"], "Marina");
        assert_eq!(record.extra["property_type_en"], "Unit");
        assert!(is_valid(&record));
    }

    #[test]
    fn test_every_numeric_column_is_sanitized_not_passed_through() {
        for col in NUMERIC_COLUMNS {
            let row = json!({ *col: "1,000" });
            let record = normalize_row(&row);

            assert_eq!(record.numeric_field(col), Some(1000.0), "column {}", col);
            assert!(record.extra.is_empty(), "column {} leaked into extra", col);
        }
    }

    #[test]
    fn test_normalize_rows_counts_drops_and_keeps_order() {
        let rows = vec![
            json!({"instance_date": "01/01/2021", "actual_worth": "100"}),
            json!({"instance_date": "garbage", "actual_worth": "200"}),
            json!({"instance_date": "02/01/2021", "actual_worth": ""}),
            json!({"instance_date": "03/01/2021", "actual_worth": "300"}),
        ];

        let outcome = normalize_rows(&rows);
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.dropped, 2);
        // Input order preserved for kept rows
        assert_eq!(outcome.kept[0].amount, Some(100.0));
        assert_eq!(outcome.kept[1].amount, Some(300.0));
    }
}
