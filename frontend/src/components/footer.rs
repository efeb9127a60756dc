//! Footer component

use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>"Data: Dubai Land Department open transactions • Built with " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
        </footer>
    }
}
