//! Application configuration.
//!
//! Centralized configuration for the dldash frontend.
//! In development these are hardcoded; in production they could be
//! loaded from environment or a config file.

/// Backend API base URL.
///
/// The dldash backend server holding the loaded dataset.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Application name shown in the header.
pub const APP_NAME: &str = "UAE Real Estate Transactions Dashboard";

/// How many of the most recent years are selected by default.
pub const DEFAULT_YEAR_WINDOW: usize = 3;

/// Height of the monthly chart drawing area, in SVG units.
pub const CHART_HEIGHT: f64 = 240.0;

/// Width of the monthly chart drawing area, in SVG units.
pub const CHART_WIDTH: f64 = 640.0;
