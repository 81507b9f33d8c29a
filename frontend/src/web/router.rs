//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程，验证由核心库的 `guard` 完成。

use intellidash::route::guard;
use intellidash::{AppRoute, GuardDecision, NavigationState, Navigator, SessionPhase};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History（push 或 replace）
fn write_history(path: &str, use_push: bool) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let result = if use_push {
                history.push_state_with_url(&JsValue::NULL, "", Some(path))
            } else {
                history.replace_state_with_url(&JsValue::NULL, "", Some(path))
            };
            if result.is_err() {
                log::warn!("[Router] Failed to update history for {}", path);
            }
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入的会话阶段信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: RwSignal<AppRoute>,
    /// 随导航传递的临时状态
    nav_state: RwSignal<NavigationState>,
    /// 会话阶段（注入的信号）
    phase: Signal<SessionPhase>,
}

impl RouterService {
    fn new(phase: Signal<SessionPhase>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        Self {
            current_route: RwSignal::new(initial_route),
            nav_state: RwSignal::new(NavigationState::default()),
            phase,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route.read_only()
    }

    pub fn nav_state(&self) -> ReadSignal<NavigationState> {
        self.nav_state.read_only()
    }

    /// Drops a consumed navigation message so it does not reappear.
    pub fn clear_message(&self) {
        self.nav_state.update(|state| state.message = None);
    }

    pub fn navigate(&self, route: AppRoute) {
        self.navigate_to_route(route, NavigationState::default(), true);
    }

    pub fn navigate_with(&self, route: AppRoute, state: NavigationState) {
        self.navigate_to_route(route, state, true);
    }

    pub fn replace(&self, route: AppRoute, state: NavigationState) {
        self.navigate_to_route(route, state, false);
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    fn navigate_to_route(&self, target: AppRoute, state: NavigationState, use_push: bool) {
        match guard(target, self.phase.get_untracked()) {
            GuardDecision::Redirect { to, from } => {
                log::info!("[Router] {} blocked, redirecting to {}", target, to);
                let state = NavigationState {
                    from,
                    ..NavigationState::default()
                };
                self.commit(to, state, use_push);
            }
            // Defer: the outlet shows a placeholder until the phase settles
            GuardDecision::Allow | GuardDecision::Defer => self.commit(target, state, use_push),
        }
    }

    fn commit(&self, route: AppRoute, state: NavigationState, use_push: bool) {
        write_history(route.to_path(), use_push);
        self.nav_state.set(state);
        self.current_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            // popstate 时也执行守卫逻辑
            router.navigate_to_route(target, NavigationState::default(), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话阶段变化时重新执行守卫
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let phase = router.phase.get();
            let route = router.current_route.get_untracked();

            if let GuardDecision::Redirect { to, from } = guard(route, phase) {
                log::info!("[Router] Session is {:?}, leaving {} for {}", phase, route, to);
                router.commit(
                    to,
                    NavigationState {
                        from,
                        ..NavigationState::default()
                    },
                    false,
                );
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
pub fn provide_router(phase: Signal<SessionPhase>) -> RouterService {
    let router = RouterService::new(phase);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure the router is provided.")
}

/// 会话层使用的导航器（replace 语义）
#[derive(Clone, Copy)]
pub struct BrowserNavigator(pub RouterService);

impl Navigator for BrowserNavigator {
    fn current_route(&self) -> AppRoute {
        self.0.current_route.get_untracked()
    }

    fn redirect(&self, route: AppRoute) {
        self.0.replace(route, NavigationState::default());
    }

    // 会话失效：记住来源页，登录后返回
    fn redirect_from(&self, route: AppRoute, from: AppRoute) {
        self.0.replace(route, NavigationState::default().with_from(from));
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件；守卫未放行时显示加载占位。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route.get();
        match guard(current, router.phase.get()) {
            GuardDecision::Allow => matcher(current),
            _ => view! {
                <div class="flex items-center justify-center min-h-[60vh]">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any(),
        }
    }
}

#[component]
pub fn Link(
    /// 目标路由
    to: AppRoute,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(to);
    };

    view! {
        <a href=to.to_path() class=class on:click=on_click>
            {children()}
        </a>
    }
}
