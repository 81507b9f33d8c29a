use std::time::Duration;

use intellidash::shared::date::format_iso;
use intellidash::shared::{Analytics, Report};
use intellidash::{AppRoute, CancelScope};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::alert::{AlertKind, InlineAlert};
use crate::components::kpi_box::KpiBox;
use crate::web::router::{Link, use_router};

const NOTICE_TIMEOUT: Duration = Duration::from_secs(3);

#[component]
pub fn ReportViewPage() -> impl IntoView {
    let router = use_router();

    let incoming = router.nav_state().get_untracked();
    let notice = RwSignal::new(incoming.message);
    let analytics = incoming.analytics;

    // 3秒后清除通知
    Effect::new(move |_| {
        if notice.with(Option::is_some) {
            set_timeout(
                move || {
                    notice.set(None);
                    router.clear_message();
                },
                NOTICE_TIMEOUT,
            );
        }
    });

    let body = match analytics {
        Some(analytics) => view! { <DataSummary analytics=analytics /> }.into_any(),
        None => view! {
            <div class="card bg-base-100 shadow">
                <div class="card-body items-center text-center">
                    <p class="text-base-content/70">"No data available for report generation"</p>
                    <Link to=AppRoute::Upload class="btn btn-primary btn-sm mt-2">"Upload Data"</Link>
                </div>
            </div>
        }
        .into_any(),
    };

    view! {
        <div class="container mx-auto p-6 max-w-4xl space-y-6">
            <h1 class="text-3xl font-bold">"Reports"</h1>
            <InlineAlert message=notice kind=AlertKind::Success />
            {body}
        </div>
    }
}

#[component]
fn DataSummary(analytics: Analytics) -> impl IntoView {
    let auth = use_auth();

    let report = RwSignal::new(None::<Report>);
    let error_msg = RwSignal::new(None::<String>);
    let is_generating = RwSignal::new(false);

    let scope = StoredValue::new(CancelScope::new());
    on_cleanup(move || scope.with_value(CancelScope::cancel));

    let features = analytics
        .features
        .iter()
        .map(|feature| {
            view! {
                <tr>
                    <td>{feature.name.clone()}</td>
                    <td class="text-base-content/60">{feature.kind.clone()}</td>
                </tr>
            }
        })
        .collect::<Vec<_>>();
    let total = analytics.total_records.to_string();
    let feature_count = analytics.features.len().to_string();
    let analytics = StoredValue::new(analytics);

    let on_generate = move |_| {
        if is_generating.get_untracked() {
            return;
        }
        is_generating.set(true);
        error_msg.set(None);

        let api = auth.api();
        let scope = scope.get_value();
        let payload = analytics.get_value();
        spawn_local(async move {
            let result = scope
                .run(async {
                    let created = api.generate_report(&payload).await?;
                    api.get_report(&created.report_id).await
                })
                .await;
            match result {
                Ok(fetched) => report.set(Some(fetched)),
                Err(err) if err.is_cancelled() => return,
                Err(err) => error_msg.set(Some(err.user_message())),
            }
            is_generating.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body space-y-4">
                <h2 class="card-title">"Data Summary"</h2>
                <div class="stats stats-vertical md:stats-horizontal">
                    <KpiBox title="Total Records" value=total />
                    <KpiBox title="Features" value=feature_count />
                </div>
                <table class="table table-sm">
                    <thead>
                        <tr><th>"Name"</th><th>"Type"</th></tr>
                    </thead>
                    <tbody>{features}</tbody>
                </table>

                <InlineAlert message=error_msg />

                <div class="card-actions justify-end">
                    <button class="btn btn-primary" disabled=move || is_generating.get() on:click=on_generate>
                        {move || if is_generating.get() {
                            view! { <span class="loading loading-spinner"></span> "Generating..." }.into_any()
                        } else {
                            "Generate Report".into_any()
                        }}
                    </button>
                </div>

                {move || report.get().map(|r| {
                    let when = r.timestamp.as_deref().map(format_iso).unwrap_or_default();
                    view! {
                        <div role="status" class="alert">
                            <div>
                                <div class="font-semibold">{format!("Report {}", r.id)}</div>
                                <div class="text-sm text-base-content/60">{when}</div>
                            </div>
                        </div>
                    }
                })}
            </div>
        </div>
    }
}
