use intellidash::AppRoute;
use leptos::prelude::*;

use crate::auth::use_auth;
use crate::web::router::{Link, use_router};

const SECTIONS: [AppRoute; 5] = [
    AppRoute::Dashboard,
    AppRoute::Upload,
    AppRoute::Insights,
    AppRoute::AiHelper,
    AppRoute::Reports,
];

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let signed_in = move || auth.state.with(|s| s.is_authenticated());

    // 高亮当前页
    let link_class = move |route: AppRoute| {
        if router.current_route().get() == route {
            "btn btn-ghost btn-sm btn-active"
        } else {
            "btn btn-ghost btn-sm"
        }
    };

    view! {
        <div class="navbar bg-base-100 shadow-md px-4">
            <div class="flex-1">
                <a
                    href="/"
                    class="btn btn-ghost text-xl font-bold text-primary"
                    on:click=move |ev| {
                        ev.prevent_default();
                        router.navigate(AppRoute::from_path("/"));
                    }
                >
                    "IntelliDash"
                </a>
            </div>
            <div class="flex-none gap-1">
                <Show
                    when=signed_in
                    fallback=move || {
                        view! {
                            <Link to=AppRoute::Login class="btn btn-ghost btn-sm">"Login"</Link>
                            <Link to=AppRoute::Register class="btn btn-primary btn-sm">"Register"</Link>
                        }
                    }
                >
                    {SECTIONS
                        .into_iter()
                        .map(|route| {
                            view! {
                                <a
                                    href=route.to_path()
                                    class=move || link_class(route)
                                    on:click=move |ev| {
                                        ev.prevent_default();
                                        router.navigate(route);
                                    }
                                >
                                    {route.title()}
                                </a>
                            }
                        })
                        .collect::<Vec<_>>()}
                    <span class="hidden md:inline text-sm text-base-content/60 mx-2">
                        {move || auth.email().unwrap_or_default()}
                    </span>
                    <button class="btn btn-outline btn-error btn-sm" on:click=move |_| auth.logout()>
                        "Logout"
                    </button>
                </Show>
            </div>
        </div>
    }
}
