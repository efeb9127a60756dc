//! Sidebar filter controls.
//!
//! Three checkbox groups (years, areas, property types) driving the
//! shared [`Selection`]. An empty group means "everything".

use leptos::*;

use crate::types::{FiltersResponse, Selection};

#[component]
pub fn FilterSidebar(
    options: FiltersResponse,
    selection: ReadSignal<Selection>,
    set_selection: WriteSignal<Selection>,
) -> impl IntoView {
    let years = options.years.clone();
    let areas = options.areas.clone();
    let property_types = options.property_types.clone();

    let on_clear = move |_| {
        set_selection.set(Selection::default());
    };

    view! {
        <aside class="sidebar">
            <h2>"Filters"</h2>

            <div class="filter-group">
                <h3>"Year"</h3>
                {years
                    .into_iter()
                    .map(|year| {
                        let checked = move || selection.get().years.contains(&year);
                        view! {
                            <label class="filter-option">
                                <input
                                    type="checkbox"
                                    prop:checked=checked
                                    on:change=move |_| {
                                        set_selection.update(|s| s.toggle_year(year));
                                    }
                                />
                                {year.to_string()}
                            </label>
                        }
                    })
                    .collect_view()}
            </div>

            <div class="filter-group">
                <h3>"Area"</h3>
                {areas
                    .into_iter()
                    .map(|area| {
                        let value = area.clone();
                        let display = area.clone();
                        let checked = {
                            let value = value.clone();
                            move || selection.get().areas.contains(&value)
                        };
                        view! {
                            <label class="filter-option">
                                <input
                                    type="checkbox"
                                    prop:checked=checked
                                    on:change=move |_| {
                                        let value = value.clone();
                                        set_selection.update(|s| s.toggle_area(value));
                                    }
                                />
                                {display}
                            </label>
                        }
                    })
                    .collect_view()}
            </div>

            <div class="filter-group">
                <h3>"Property Type"</h3>
                {property_types
                    .into_iter()
                    .map(|property_type| {
                        let value = property_type.clone();
                        let display = property_type.clone();
                        let checked = {
                            let value = value.clone();
                            move || selection.get().property_types.contains(&value)
                        };
                        view! {
                            <label class="filter-option">
                                <input
                                    type="checkbox"
                                    prop:checked=checked
                                    on:change=move |_| {
                                        let value = value.clone();
                                        set_selection.update(|s| s.toggle_property_type(value));
                                    }
                                />
                                {display}
                            </label>
                        }
                    })
                    .collect_view()}
            </div>

            <button class="clear-button" on:click=on_clear>
                "Clear filters"
            </button>
        </aside>
    }
}
