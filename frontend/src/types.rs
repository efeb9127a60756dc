//! Common types used across the frontend application.
//!
//! The API types mirror the backend's `api::types` shapes exactly
//! (camelCase on the wire).

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// API Response Types
// =============================================================================

/// Full dashboard payload for one filter selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Rows in the filtered view
    pub row_count: usize,
    /// Latest year in view
    pub current_year: Option<i32>,
    /// The comparison year
    pub previous_year: Option<i32>,
    /// Headline cards (count, total, mean)
    pub kpis: Vec<KpiCard>,
    /// Monthly transaction value, chronological
    pub monthly: Vec<SeriesPoint>,
    /// Top areas by transaction value, descending
    pub top_areas: Vec<SeriesPoint>,
}

/// One KPI card, pre-formatted by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    pub yoy: String,
    pub raw: f64,
}

/// One labeled point of a chart series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Distinct values available for the sidebar filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersResponse {
    pub years: Vec<i32>,
    pub areas: Vec<String>,
    pub property_types: Vec<String>,
}

// =============================================================================
// Selection
// =============================================================================

/// The user's current filter selection. Empty lists select everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub years: Vec<i32>,
    pub areas: Vec<String>,
    pub property_types: Vec<String>,
}

impl Selection {
    pub fn toggle_year(&mut self, year: i32) {
        toggle(&mut self.years, year);
    }

    pub fn toggle_area(&mut self, area: String) {
        toggle(&mut self.areas, area);
    }

    pub fn toggle_property_type(&mut self, property_type: String) {
        toggle(&mut self.property_types, property_type);
    }
}

fn toggle<T: PartialEq>(list: &mut Vec<T>, value: T) {
    match list.iter().position(|v| *v == value) {
        Some(i) => {
            list.remove(i);
        }
        None => list.push(value),
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Frontend application errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    /// Network/HTTP error.
    Network(String),
    /// The backend rejected the request or the dataset is unusable.
    Backend(String),
    /// Response body could not be decoded.
    Decode(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Backend(msg) => write!(f, "Backend error: {}", msg),
            AppError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

/// Result type alias for frontend operations.
pub type AppResult<T> = Result<T, AppError>;
