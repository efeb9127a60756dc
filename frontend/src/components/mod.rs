//! UI components.

pub mod charts;
pub mod filters;
pub mod footer;
pub mod header;
pub mod kpi_cards;

pub use charts::{MonthlyChart, TopAreasChart};
pub use filters::FilterSidebar;
pub use footer::Footer;
pub use header::Header;
pub use kpi_cards::KpiCards;
