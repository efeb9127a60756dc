//! HTTP service for fetching dashboard data from the backend.

use gloo_net::http::Request;

use crate::types::{AppError, AppResult, DashboardResponse, FiltersResponse, Selection};

/// Build the query string for a selection. Empty lists are omitted.
pub fn selection_query(selection: &Selection) -> String {
    let mut params = Vec::new();

    if !selection.years.is_empty() {
        let years: Vec<String> = selection.years.iter().map(|y| y.to_string()).collect();
        params.push(format!("years={}", years.join(",")));
    }
    if !selection.areas.is_empty() {
        params.push(format!("areas={}", encode_list(&selection.areas)));
    }
    if !selection.property_types.is_empty() {
        params.push(format!("types={}", encode_list(&selection.property_types)));
    }

    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    }
}

fn encode_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| String::from(js_sys::encode_uri_component(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Download URL for the currently filtered view.
pub fn export_url(backend_url: &str, selection: &Selection) -> String {
    format!("{}/api/export{}", backend_url, selection_query(selection))
}

/// Fetch the dashboard payload for a selection.
pub async fn fetch_dashboard(
    backend_url: &str,
    selection: &Selection,
) -> AppResult<DashboardResponse> {
    let url = format!("{}/api/dashboard{}", backend_url, selection_query(selection));
    get_json(&url).await
}

/// Fetch the distinct filter values for the sidebar.
pub async fn fetch_filters(backend_url: &str) -> AppResult<FiltersResponse> {
    let url = format!("{}/api/filters", backend_url);
    get_json(&url).await
}

async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> AppResult<T> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    if !response.ok() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AppError::Backend(format!(
            "{}: {}",
            response.status(),
            body
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::Decode(e.to_string()))
}
