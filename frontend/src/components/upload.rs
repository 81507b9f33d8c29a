use intellidash::shared::FileEntry;
use intellidash::shared::date::format_epoch_secs;
use intellidash::upload::{self, CsvFile, UploadOutcome};
use intellidash::{AppRoute, CancelScope};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::HtmlInputElement;

use crate::auth::use_auth;
use crate::components::alert::InlineAlert;
use crate::web::read_file;
use crate::web::router::use_router;

#[component]
pub fn UploadPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    // 未登录直接送回登录页
    if !auth.is_authenticated() {
        router.replace(AppRoute::Login, upload::login_required_state());
    }

    let selected = RwSignal::new(None::<CsvFile>);
    let error_msg = RwSignal::new(None::<String>);
    let is_uploading = RwSignal::new(false);
    let files = RwSignal::new(Vec::<FileEntry>::new());

    let scope = StoredValue::new(CancelScope::new());
    on_cleanup(move || scope.with_value(CancelScope::cancel));

    let refresh_files = move || {
        let api = auth.api();
        let scope = scope.get_value();
        spawn_local(async move {
            match scope.run(api.list_files()).await {
                Ok(list) => files.set(list.recent(usize::MAX)),
                Err(err) if err.is_cancelled() => {}
                Err(err) => log::warn!("Could not list uploads: {}", err),
            }
        });
    };
    // 初始加载
    refresh_files();

    let on_file_change = move |ev: leptos::ev::Event| {
        error_msg.set(None);
        let input = event_target::<HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|list| list.get(0)) else {
            selected.set(None);
            return;
        };
        spawn_local(async move {
            match read_file(file).await {
                Ok((name, content_type, bytes)) => {
                    match CsvFile::new(&name, &content_type, bytes) {
                        Ok(csv) => selected.set(Some(csv)),
                        Err(err) => {
                            selected.set(None);
                            error_msg.set(Some(err.to_string()));
                        }
                    }
                }
                Err(err) => {
                    selected.set(None);
                    error_msg.set(Some(err));
                }
            }
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_uploading.get_untracked() {
            return;
        }
        let file = match selected.with_untracked(|s| upload::require_file(s.as_ref()).cloned()) {
            Ok(file) => file,
            Err(err) => {
                error_msg.set(Some(err.to_string()));
                return;
            }
        };

        is_uploading.set(true);
        error_msg.set(None);
        let api = auth.api();
        let scope = scope.get_value();
        spawn_local(async move {
            let result = scope.run(api.upload_file(file.into())).await;
            match UploadOutcome::from_result(result) {
                UploadOutcome::Uploaded(state) => router.navigate_with(AppRoute::Reports, state),
                // 客户端已跳转到登录页，这里只补上提示信息
                UploadOutcome::SessionExpired(state) => router.replace(AppRoute::Login, state),
                UploadOutcome::Failed(message) => {
                    error_msg.set(Some(message));
                    is_uploading.set(false);
                }
                UploadOutcome::Cancelled => {}
            }
        });
    };

    let on_delete = move |name: String| {
        let api = auth.api();
        let scope = scope.get_value();
        spawn_local(async move {
            match scope.run(api.delete_file(&name)).await {
                Ok(_) => files.update(|list| list.retain(|f| f.name != name)),
                Err(err) if err.is_cancelled() => {}
                Err(err) => error_msg.set(Some(err.user_message())),
            }
        });
    };

    view! {
        <div class="container mx-auto p-6 max-w-3xl space-y-6">
            <h1 class="text-3xl font-bold">"Upload Data"</h1>

            <div class="card bg-base-100 shadow-xl">
                <form class="card-body" on:submit=on_submit>
                    <InlineAlert message=error_msg />

                    <input
                        type="file"
                        accept=".csv,text/csv"
                        class="file-input file-input-bordered w-full"
                        on:change=on_file_change
                    />

                    <Show when=move || selected.with(Option::is_some)>
                        <div>
                            <h3 class="font-semibold mb-2">
                                {move || selected.with(|s| {
                                    s.as_ref()
                                        .map(|f| format!("Preview of {} ({} bytes)", f.name, f.size()))
                                        .unwrap_or_default()
                                })}
                            </h3>
                            <pre class="bg-base-200 rounded p-3 text-xs overflow-x-auto">
                                {move || selected.with(|s| s.as_ref().map(CsvFile::preview).unwrap_or_default())}
                            </pre>
                        </div>
                    </Show>

                    <div class="card-actions justify-end">
                        <button class="btn btn-primary" disabled=move || is_uploading.get()>
                            {move || if is_uploading.get() {
                                view! { <span class="loading loading-spinner"></span> "Uploading..." }.into_any()
                            } else {
                                "Upload".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h2 class="card-title">"Your files"</h2>
                    <Show
                        when=move || files.with(|f| !f.is_empty())
                        fallback=|| view! { <p class="text-base-content/50">"Nothing uploaded yet."</p> }
                    >
                        <ul class="divide-y divide-base-200">
                            <For
                                each=move || files.get()
                                key=|file| file.name.clone()
                                children=move |file| {
                                    let name = file.name.clone();
                                    let when = format_epoch_secs(file.uploaded_at).unwrap_or_default();
                                    view! {
                                        <li class="flex items-center justify-between py-2 gap-4">
                                            <span class="font-mono flex-1">{file.name}</span>
                                            <span class="text-sm text-base-content/60">{when}</span>
                                            <button
                                                class="btn btn-ghost btn-xs text-error"
                                                on:click=move |_| on_delete(name.clone())
                                            >
                                                "Delete"
                                            </button>
                                        </li>
                                    }
                                }
                            />
                        </ul>
                    </Show>
                </div>
            </div>
        </div>
    }
}
