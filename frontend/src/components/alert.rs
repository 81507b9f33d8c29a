use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Success,
    Info,
}

impl AlertKind {
    fn class(&self) -> &'static str {
        match self {
            AlertKind::Error => "alert alert-error text-sm py-2",
            AlertKind::Success => "alert alert-success text-sm py-2",
            AlertKind::Info => "alert alert-info text-sm py-2",
        }
    }
}

/// Inline message with a dismiss button. Renders nothing while `message` is `None`.
#[component]
pub fn InlineAlert(
    message: RwSignal<Option<String>>,
    #[prop(default = AlertKind::Error)] kind: AlertKind,
) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div role="alert" class=kind.class()>
                <span class="flex-1">{move || message.get().unwrap_or_default()}</span>
                <button
                    type="button"
                    class="btn btn-ghost btn-xs"
                    aria-label="Dismiss"
                    on:click=move |_| message.set(None)
                >
                    "✕"
                </button>
            </div>
        </Show>
    }
}
