use leptos::*;

use crate::config::APP_NAME;
use crate::services::export_url;
use crate::types::Selection;

#[component]
pub fn Header(
    selection: ReadSignal<Selection>,
    row_count: Signal<Option<usize>>,
) -> impl IntoView {
    view! {
        <header>
            <div class="header-left">
                <a href="#" class="logo">"DLDASH"</a>
                <span class="badge">{APP_NAME}</span>
            </div>
            <div class="header-right">
                <span class="row-count">
                    {move || match row_count.get() {
                        Some(n) => format!("{} transactions", n),
                        None => "--".to_string(),
                    }}
                </span>
                <a
                    class="export-button"
                    href=move || export_url(crate::config::BACKEND_URL, &selection.get())
                    download="dld_filtered.csv"
                >
                    "Download CSV"
                </a>
            </div>
        </header>
    }
}
