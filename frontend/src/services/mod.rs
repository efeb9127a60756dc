//! Backend communication.

pub mod api;

pub use api::{export_url, fetch_dashboard, fetch_filters, selection_query};
