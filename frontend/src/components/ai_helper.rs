use intellidash::CancelScope;
use intellidash::chat::{self, ChatMessage, GREETING, Sender, Transcript};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;

fn bubble(message: ChatMessage) -> impl IntoView {
    let (side, tone) = match message.sender {
        Sender::User => ("chat chat-end", "chat-bubble chat-bubble-primary"),
        Sender::Ai => ("chat chat-start", "chat-bubble"),
    };
    view! {
        <div class=side>
            <div class=tone>{message.text}</div>
        </div>
    }
}

#[component]
pub fn AiHelperPage() -> impl IntoView {
    let auth = use_auth();

    let transcript = RwSignal::new(Transcript::new());
    let input = RwSignal::new(String::new());
    let is_thinking = RwSignal::new(false);

    let scope = StoredValue::new(CancelScope::new());
    on_cleanup(move || scope.with_value(CancelScope::cancel));

    // 初始加载：历史记录尽力而为，失败时保持空白
    let api = auth.api();
    let runner = scope.get_value();
    spawn_local(async move {
        match runner.run(api.chat_history()).await {
            Ok(history) => {
                let email = auth.state.with_untracked(|s| s.email().map(str::to_string));
                transcript.update(|t| {
                    t.seed(&history, email.as_deref());
                });
            }
            Err(err) if err.is_cancelled() => {}
            Err(err) => log::debug!("No chat history: {}", err),
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if is_thinking.get_untracked() {
            return;
        }
        let Some(question) = chat::prepare_question(&input.get_untracked()) else {
            return;
        };

        transcript.update(|t| {
            t.push(Sender::User, question.clone());
        });
        input.set(String::new());
        is_thinking.set(true);

        let api = auth.api();
        let scope = scope.get_value();
        spawn_local(async move {
            let result = scope.run(api.send_message(&question)).await;
            if let Some(text) = chat::reply_text(result) {
                transcript.update(|t| {
                    t.push(Sender::Ai, text);
                });
                is_thinking.set(false);
            }
        });
    };

    view! {
        <div class="container mx-auto p-6 max-w-3xl flex flex-col gap-4">
            <h1 class="text-3xl font-bold">"AI Helper"</h1>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body min-h-[50vh] max-h-[65vh] overflow-y-auto">
                    <Show when=move || transcript.with(Transcript::is_empty) && !is_thinking.get()>
                        <div class="chat chat-start">
                            <div class="chat-bubble">{GREETING}</div>
                        </div>
                    </Show>
                    <For
                        each=move || transcript.with(|t| t.messages().to_vec())
                        key=|message| message.id
                        children=bubble
                    />
                    <Show when=move || is_thinking.get()>
                        <div class="chat chat-start">
                            <div class="chat-bubble opacity-70">
                                <span class="loading loading-dots loading-xs mr-2"></span>
                                "Thinking..."
                            </div>
                        </div>
                    </Show>
                </div>
            </div>

            <form class="join w-full" on:submit=on_submit>
                <input
                    type="text"
                    class="input input-bordered join-item flex-1"
                    placeholder="Ask a question about your data..."
                    on:input=move |ev| input.set(event_target_value(&ev))
                    prop:value=input
                    disabled=move || is_thinking.get()
                />
                <button class="btn btn-primary join-item" disabled=move || is_thinking.get()>
                    "Send"
                </button>
            </form>
        </div>
    }
}
