//! Headline KPI cards.
//!
//! The backend pre-formats the values and the year-over-year deltas,
//! so this component only lays them out.

use leptos::*;

use crate::types::KpiCard;

#[component]
pub fn KpiCards(kpis: Vec<KpiCard>, previous_year: Option<i32>) -> impl IntoView {
    let yoy_caption = match previous_year {
        Some(year) => format!("vs {}", year),
        None => "vs previous year".to_string(),
    };

    view! {
        <section class="kpi-row">
            {kpis
                .into_iter()
                .map(|kpi| {
                    let negative = kpi.yoy.starts_with('-');
                    view! {
                        <div class="kpi-card">
                            <div class="kpi-title">{kpi.title}</div>
                            <div class="kpi-value">{kpi.value}</div>
                            <div class="kpi-yoy" class:negative=negative>
                                {kpi.yoy} " " {yoy_caption.clone()}
                            </div>
                        </div>
                    }
                })
                .collect_view()}
        </section>
    }
}
