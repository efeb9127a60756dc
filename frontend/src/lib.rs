//! dldash - Frontend Rust/Leptos Application
//!
//! A WebAssembly dashboard over cleaned Dubai Land Department
//! transaction extracts, served by the dldash backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (row count, CSV export)                              │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │  FilterSidebar│  MainContent                                 │
//! │  (years,      │  ├── KpiCards (count, total, mean + YoY)    │
//! │   areas,      │  ├── MonthlyChart (value per month)         │
//! │   types)      │  └── TopAreasChart (top areas by value)     │
//! ├──────────────┴──────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Common types (DashboardResponse, Selection, etc.)
//! - [`components`] - UI components (Header, FilterSidebar, charts, etc.)
//! - [`services`] - Backend communication

use leptos::*;
use leptos_router::*;
use wasm_bindgen::prelude::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod components;
pub mod config;
pub mod services;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // API
    DashboardResponse, FiltersResponse, KpiCard, SeriesPoint,
    // Filters
    Selection,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// WASM entry point - called automatically by trunk.
#[wasm_bindgen(start)]
pub fn start() {
    // Setup panic hook for better error messages
    console_error_panic_hook::set_once();

    // Setup console logging
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 dldash - Starting Leptos App");

    // Mount the application
    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    // Global state for the application
    let (selection, set_selection) = create_signal(Selection::default());
    let (defaults_applied, set_defaults_applied) = create_signal(false);

    // Distinct filter values, fetched once at startup.
    let filter_options = create_resource(
        || (),
        |_| async move { fetch_filters(BACKEND_URL).await },
    );

    // Dashboard payload, refetched whenever the selection changes.
    let dashboard = create_resource(
        move || selection.get(),
        |selection| async move { fetch_dashboard(BACKEND_URL, &selection).await },
    );

    // Default to the most recent years once the filter values arrive.
    create_effect(move |_| {
        if defaults_applied.get() {
            return;
        }
        if let Some(Ok(options)) = filter_options.get() {
            let mut years = options.years.clone();
            years.sort_unstable();
            let recent: Vec<i32> = years
                .into_iter()
                .rev()
                .take(DEFAULT_YEAR_WINDOW)
                .collect();
            if !recent.is_empty() {
                set_selection.update(|s| s.years = recent);
            }
            set_defaults_applied.set(true);
        }
    });

    let row_count = Signal::derive(move || {
        dashboard
            .get()
            .and_then(|result| result.ok())
            .map(|response| response.row_count)
    });

    view! {
        <Header selection=selection row_count=row_count/>

        <div class="container">
            {move || match filter_options.get() {
                None => view! { <p class="loading">"Loading filters..."</p> }.into_view(),
                Some(Err(e)) => {
                    log::error!("❌ Filter fetch failed: {}", e);
                    view! { <ErrorPanel message=e.to_string()/> }.into_view()
                }
                Some(Ok(options)) => view! {
                    <div class="layout">
                        <FilterSidebar
                            options=options
                            selection=selection
                            set_selection=set_selection
                        />
                        <DashboardPanel dashboard=dashboard/>
                    </div>
                }
                .into_view(),
            }}
        </div>

        <Footer/>
    }
}

#[component]
fn DashboardPanel(
    dashboard: Resource<Selection, AppResult<DashboardResponse>>,
) -> impl IntoView {
    view! {
        <div class="content">
            {move || match dashboard.get() {
                None => view! { <p class="loading">"Loading dashboard..."</p> }.into_view(),
                Some(Err(e)) => {
                    log::error!("❌ Dashboard fetch failed: {}", e);
                    view! { <ErrorPanel message=e.to_string()/> }.into_view()
                }
                Some(Ok(response)) => view! {
                    <KpiCards kpis=response.kpis previous_year=response.previous_year/>
                    <MonthlyChart monthly=response.monthly/>
                    <TopAreasChart top_areas=response.top_areas/>
                }
                .into_view(),
            }}
        </div>
    }
}

/// Fatal error panel. Shown when the backend is unreachable or the
/// dataset could not be served, instead of an empty dashboard.
#[component]
fn ErrorPanel(message: String) -> impl IntoView {
    view! {
        <div class="error-panel">
            <h2>"⚠️ Dashboard unavailable"</h2>
            <p>{message}</p>
            <p>"Check that the dldash backend is running and serving a cleaned dataset."</p>
        </div>
    }
}
