use leptos::prelude::*;

/// One KPI tile.
#[component]
pub fn KpiBox(#[prop(into)] title: String, #[prop(into)] value: String) -> impl IntoView {
    view! {
        <div class="stat bg-base-100 rounded-box shadow">
            <div class="stat-title">{title}</div>
            <div class="stat-value text-primary text-3xl">{value}</div>
        </div>
    }
}
