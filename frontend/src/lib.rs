//! IntelliDash 前端应用
//!
//! Context-Driven 架构：
//! - `web::router`: History 路由服务与守卫
//! - `auth`: 会话状态接入 Leptos
//! - `components`: 页面与 UI 组件
//!
//! 业务规则（守卫、请求、上传校验、图表布局）都在 `intellidash` 核心库里，
//! 这里只负责渲染和浏览器适配。

mod auth;
mod components {
    pub mod ai_helper;
    pub mod alert;
    pub mod chart_card;
    pub mod dashboard;
    pub mod insights;
    pub mod kpi_box;
    pub mod login;
    pub mod navbar;
    pub mod register;
    pub mod report_view;
    pub mod upload;
}
mod web;

use intellidash::{AppRoute, SessionState};
use leptos::prelude::*;

use crate::auth::AuthContext;
use crate::components::ai_helper::AiHelperPage;
use crate::components::dashboard::DashboardPage;
use crate::components::insights::InsightsPage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::register::RegisterPage;
use crate::components::report_view::ReportViewPage;
use crate::components::upload::UploadPage;
use crate::web::router::{Link, RouterOutlet, provide_router};

/// 路由匹配函数
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Upload => view! { <UploadPage /> }.into_any(),
        AppRoute::Insights => view! { <InsightsPage /> }.into_any(),
        AppRoute::AiHelper => view! { <AiHelperPage /> }.into_any(),
        AppRoute::Reports => view! { <ReportViewPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[60vh]">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Dashboard class="btn btn-link">"Back to dashboard"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 会话状态信号；路由只看由它派生的阶段
    let state = RwSignal::new(SessionState::default());
    let phase = Memo::new(move |_| state.with(|s| s.phase));

    // 2. 路由服务
    let router = provide_router(phase.into());

    // 3. 认证上下文（持有 API 客户端与会话）
    let auth = AuthContext::new(state, router);
    provide_context(auth);

    // 4. 校验已存储的令牌
    auth.restore();

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <Navbar />
            <main>
                <RouterOutlet matcher=route_matcher />
            </main>
        </div>
    }
}
