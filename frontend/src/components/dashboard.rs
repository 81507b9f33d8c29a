use intellidash::shared::FileEntry;
use intellidash::shared::date::format_epoch_secs;
use intellidash::{AppRoute, CancelScope};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::web::router::Link;

const RECENT_LIMIT: usize = 5;

const FEATURES: [(AppRoute, &str, &str); 4] = [
    (
        AppRoute::Upload,
        "Upload Data",
        "Upload your CSV file to generate reports",
    ),
    (
        AppRoute::Reports,
        "Reports",
        "View and analyze your generated reports",
    ),
    (
        AppRoute::Insights,
        "Insights",
        "Key numbers and charts across your data",
    ),
    (
        AppRoute::AiHelper,
        "AI Helper",
        "Get AI-powered insights about your data",
    ),
];

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    let recent = RwSignal::new(None::<Vec<FileEntry>>);
    let scope = StoredValue::new(CancelScope::new());
    on_cleanup(move || scope.with_value(CancelScope::cancel));

    // 初始加载
    let api = auth.api();
    let runner = scope.get_value();
    spawn_local(async move {
        match runner.run(api.list_files()).await {
            Ok(list) => recent.set(Some(list.recent(RECENT_LIMIT))),
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                log::warn!("Could not load recent uploads: {}", err);
                recent.set(Some(Vec::new()));
            }
        }
    });

    let cards = FEATURES
        .into_iter()
        .map(|(route, title, blurb)| {
            view! {
                <Link to=route class="card bg-base-100 shadow-xl hover:shadow-2xl transition-shadow">
                    <div class="card-body">
                        <h2 class="card-title">{title}</h2>
                        <p class="text-base-content/70">{blurb}</p>
                    </div>
                </Link>
            }
        })
        .collect::<Vec<_>>();

    view! {
        <div class="container mx-auto p-6 space-y-8">
            <div>
                <h1 class="text-3xl font-bold">
                    {move || format!("Welcome back, {}", auth.email().unwrap_or_default())}
                </h1>
                <p class="text-base-content/70 mt-1">"What would you like to do today?"</p>
            </div>

            <div class="grid gap-6 md:grid-cols-2 lg:grid-cols-4">{cards}</div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h2 class="card-title">"Recent Activity"</h2>
                    {move || match recent.get() {
                        None => view! { <span class="loading loading-dots"></span> }.into_any(),
                        Some(files) if files.is_empty() => view! {
                            <p class="text-base-content/50">"No recent uploads yet."</p>
                        }
                        .into_any(),
                        Some(files) => view! {
                            <ul class="divide-y divide-base-200">
                                {files
                                    .into_iter()
                                    .map(|file| {
                                        let when = format_epoch_secs(file.uploaded_at)
                                            .unwrap_or_default();
                                        view! {
                                            <li class="flex justify-between py-2">
                                                <span class="font-mono">{file.name}</span>
                                                <span class="text-sm text-base-content/60">{when}</span>
                                            </li>
                                        }
                                    })
                                    .collect::<Vec<_>>()}
                            </ul>
                        }
                        .into_any(),
                    }}
                </div>
            </div>
        </div>
    }
}
