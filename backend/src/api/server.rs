//! HTTP server for the dashboard frontend.
//!
//! The dataset is loaded once by the caller and shared with every handler
//! as `Arc<Dataset>` state; handlers never reload or mutate it.
//!
//! # API Endpoints
//!
//! | Method | Path             | Description                              |
//! |--------|------------------|------------------------------------------|
//! | GET    | `/health`        | Health check                             |
//! | GET    | `/api/dashboard` | KPIs and chart series for a selection    |
//! | GET    | `/api/filters`   | Distinct filter values for the sidebar   |
//! | GET    | `/api/export`    | Filtered view as a CSV download          |
//! | POST   | `/api/upload`    | Clean an uploaded raw extract            |
//! | GET    | `/api/logs`      | SSE stream of pipeline logs              |

use axum::{
    extract::{Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, kpi_cards, DashboardResponse, FiltersResponse, SeriesPoint, UploadResponse};
use crate::analytics::{kpi_summary, monthly_totals, top_areas, Dataset, FilterSelection, export_csv};
use crate::error::{ServerError, ServerResult};
use crate::pipeline::{clean_bytes, CleanOptions};

/// How many areas the top-areas chart shows.
const TOP_AREAS_LIMIT: usize = 10;

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ServerError::Pipeline(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Start the HTTP server over a loaded dataset.
pub async fn start_server(port: u16, dataset: Arc<Dataset>) -> ServerResult<()> {
    // Permissive CORS for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/dashboard", get(dashboard))
        .route("/api/filters", get(filters))
        .route("/api/export", get(export))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(dataset);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 dldash server running on http://localhost:{}", port);
    println!("   GET  /api/dashboard - KPIs and charts");
    println!("   GET  /api/filters   - Sidebar filter values");
    println!("   GET  /api/export    - Filtered CSV download");
    println!("   POST /api/upload    - Clean a raw extract");
    println!("   GET  /api/logs      - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot bind port {}: {}", port, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "dldash",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Comma-separated filter values from the query string.
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    years: Option<String>,
    areas: Option<String>,
    types: Option<String>,
}

impl FilterQuery {
    fn selection(&self) -> FilterSelection {
        FilterSelection {
            years: split_list(&self.years)
                .filter_map(|s| s.parse().ok())
                .collect(),
            areas: split_list(&self.areas).map(String::from).collect(),
            property_types: split_list(&self.types).map(String::from).collect(),
        }
    }
}

fn split_list(raw: &Option<String>) -> impl Iterator<Item = &str> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// KPIs and chart series for the current selection
async fn dashboard(
    State(dataset): State<Arc<Dataset>>,
    Query(query): Query<FilterQuery>,
) -> Json<DashboardResponse> {
    let rows = dataset.filter(&query.selection());
    let summary = kpi_summary(&rows);

    Json(DashboardResponse {
        row_count: rows.len(),
        current_year: summary.as_ref().map(|s| s.current_year),
        previous_year: summary.as_ref().map(|s| s.previous_year),
        kpis: summary.as_ref().map(kpi_cards).unwrap_or_default(),
        monthly: monthly_totals(&rows)
            .into_iter()
            .map(SeriesPoint::from)
            .collect(),
        top_areas: top_areas(&rows, TOP_AREAS_LIMIT)
            .into_iter()
            .map(SeriesPoint::from)
            .collect(),
    })
}

/// Distinct filter values for the sidebar
async fn filters(State(dataset): State<Arc<Dataset>>) -> Json<FiltersResponse> {
    Json(FiltersResponse::from(dataset.filter_options()))
}

/// Filtered view as a CSV attachment
async fn export(
    State(dataset): State<Arc<Dataset>>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let rows = dataset.filter(&query.selection());
    let body = export_csv(&rows);

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"dld_filtered.csv\"",
            ),
        ],
        body,
    )
}

/// Clean an uploaded raw extract and report the outcome
async fn upload_csv(mut multipart: Multipart) -> Result<Json<UploadResponse>, ServerError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data
        .ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    let result = clean_bytes(&bytes, &CleanOptions::default())?;

    Ok(Json(UploadResponse::from(result)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_parsing() {
        let query = FilterQuery {
            years: Some("2023, 2024, notayear".to_string()),
            areas: Some("Marina,Deira".to_string()),
            types: None,
        };

        let selection = query.selection();
        assert_eq!(selection.years, vec![2023, 2024]);
        assert_eq!(selection.areas, vec!["Marina", "Deira"]);
        assert!(selection.property_types.is_empty());
    }

    #[test]
    fn test_empty_query_selects_everything() {
        let selection = FilterQuery::default().selection();
        assert_eq!(selection, FilterSelection::default());
    }
}
