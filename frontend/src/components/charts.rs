//! Dependency-free SVG/CSS charts.
//!
//! A polyline for the monthly transaction-value series and horizontal
//! bars for the top areas. Both scale to the maximum value in view.

use leptos::*;

use crate::config::{CHART_HEIGHT, CHART_WIDTH};
use crate::types::SeriesPoint;

/// Margin around the monthly polyline, in SVG units.
const CHART_PADDING: f64 = 16.0;

#[component]
pub fn MonthlyChart(monthly: Vec<SeriesPoint>) -> impl IntoView {
    let max_value = monthly
        .iter()
        .map(|p| p.value)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let inner_width = CHART_WIDTH - 2.0 * CHART_PADDING;
    let inner_height = CHART_HEIGHT - 2.0 * CHART_PADDING;
    let step = if monthly.len() > 1 {
        inner_width / (monthly.len() - 1) as f64
    } else {
        0.0
    };

    let points = monthly
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = CHART_PADDING + step * i as f64;
            let y = CHART_PADDING + inner_height * (1.0 - p.value / max_value);
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ");

    let first_label = monthly.first().map(|p| p.label.clone()).unwrap_or_default();
    let last_label = monthly.last().map(|p| p.label.clone()).unwrap_or_default();
    let empty = monthly.is_empty();

    view! {
        <section class="chart-card">
            <h3>"Monthly Transaction Value (AED)"</h3>
            <Show
                when=move || !empty
                fallback=|| view! { <p class="chart-empty">"No data for this selection"</p> }
            >
                <svg
                    viewBox=format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT)
                    class="monthly-chart"
                    preserveAspectRatio="none"
                >
                    <polyline points=points.clone() fill="none" class="chart-line"/>
                </svg>
                <div class="chart-axis">
                    <span>{first_label.clone()}</span>
                    <span>{last_label.clone()}</span>
                </div>
            </Show>
        </section>
    }
}

#[component]
pub fn TopAreasChart(top_areas: Vec<SeriesPoint>) -> impl IntoView {
    let max_value = top_areas
        .iter()
        .map(|p| p.value)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let empty = top_areas.is_empty();

    view! {
        <section class="chart-card">
            <h3>"Top Areas by Transaction Value"</h3>
            <Show
                when=move || !empty
                fallback=|| view! { <p class="chart-empty">"No data for this selection"</p> }
            >
                <div class="bar-chart">
                    {top_areas
                        .clone()
                        .into_iter()
                        .map(|point| {
                            let percent = point.value / max_value * 100.0;
                            view! {
                                <div class="bar-row">
                                    <span class="bar-label">{point.label}</span>
                                    <div class="bar-track">
                                        <div
                                            class="bar-fill"
                                            style=format!("width: {:.1}%", percent)
                                        ></div>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            </Show>
        </section>
    }
}
