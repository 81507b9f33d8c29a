use intellidash::CancelScope;
use intellidash::insights::{self, InsightsData, LOAD_FAILED_MESSAGE};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::chart_card::ChartCard;
use crate::components::kpi_box::KpiBox;

#[derive(Clone)]
enum LoadState {
    Loading,
    Ready(InsightsData),
    Failed,
}

#[component]
pub fn InsightsPage() -> impl IntoView {
    let auth = use_auth();
    let state = RwSignal::new(LoadState::Loading);

    let scope = StoredValue::new(CancelScope::new());
    on_cleanup(move || scope.with_value(CancelScope::cancel));

    // 初始加载：统计与图表并行请求
    let api = auth.api();
    let runner = scope.get_value();
    spawn_local(async move {
        match runner.run(insights::load(&api)).await {
            Ok(data) => state.set(LoadState::Ready(data)),
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                log::error!("Loading insights failed: {}", err);
                state.set(LoadState::Failed);
            }
        }
    });

    view! {
        <div class="container mx-auto p-6 space-y-6">
            <h1 class="text-3xl font-bold">"Insights"</h1>
            {move || match state.get() {
                LoadState::Loading => view! {
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
                .into_any(),
                LoadState::Failed => view! {
                    <div role="alert" class="alert alert-error">{LOAD_FAILED_MESSAGE}</div>
                }
                .into_any(),
                LoadState::Ready(data) => view! {
                    <div class="grid gap-4 md:grid-cols-2 lg:grid-cols-4">
                        {data
                            .kpis
                            .into_iter()
                            .map(|kpi| view! { <KpiBox title=kpi.label value=kpi.value /> })
                            .collect::<Vec<_>>()}
                    </div>
                    <div class="grid gap-6 lg:grid-cols-2">
                        {data
                            .charts
                            .into_iter()
                            .map(|spec| view! { <ChartCard spec=spec /> })
                            .collect::<Vec<_>>()}
                    </div>
                }
                .into_any(),
            }}
        </div>
    }
}
