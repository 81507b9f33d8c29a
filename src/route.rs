//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、导航附带的状态以及守卫判定。

use std::fmt::Display;

use intellidash_shared::Analytics;

use crate::session::SessionPhase;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    /// 控制面板 (需要认证)
    Dashboard,
    Upload,
    Insights,
    AiHelper,
    Reports,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/dashboard" => Self::Dashboard,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/upload" => Self::Upload,
            "/insights" => Self::Insights,
            "/ai-helper" => Self::AiHelper,
            "/reports" => Self::Reports,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Upload => "/upload",
            Self::Insights => "/insights",
            Self::AiHelper => "/ai-helper",
            Self::Reports => "/reports",
            Self::NotFound => "/404",
        }
    }

    /// Navbar label.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Dashboard => "Dashboard",
            Self::Upload => "Upload",
            Self::Insights => "Insights",
            Self::AiHelper => "AI Helper",
            Self::Reports => "Reports",
            Self::NotFound => "Not Found",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Dashboard | Self::Upload | Self::Insights | Self::AiHelper | Self::Reports
        )
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        self.is_public()
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 导航时附带的临时状态
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationState {
    /// The protected route the user was bounced from.
    pub from: Option<AppRoute>,
    pub message: Option<String>,
    /// Prefills the login form after registration.
    pub email: Option<String>,
    pub analytics: Option<Analytics>,
}

impl NavigationState {
    pub fn with_from(mut self, route: AppRoute) -> Self {
        self.from = Some(route);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_analytics(mut self, analytics: Analytics) -> Self {
        self.analytics = Some(analytics);
        self
    }
}

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Session still being verified; render a placeholder and decide later.
    Defer,
    Redirect {
        to: AppRoute,
        /// Route to return to after login.
        from: Option<AppRoute>,
    },
}

/// 路由守卫：目标路由 + 会话阶段 -> 判定
pub fn guard(target: AppRoute, phase: SessionPhase) -> GuardDecision {
    match phase {
        SessionPhase::Verifying => GuardDecision::Defer,
        SessionPhase::Anonymous if target.requires_auth() => GuardDecision::Redirect {
            to: AppRoute::auth_failure_redirect(),
            from: Some(target),
        },
        SessionPhase::Authenticated if target.should_redirect_when_authenticated() => {
            GuardDecision::Redirect {
                to: AppRoute::auth_success_redirect(),
                from: None,
            }
        }
        _ => GuardDecision::Allow,
    }
}

/// Where the session layer sends the user (replace-style navigation).
pub trait Navigator {
    fn current_route(&self) -> AppRoute;
    fn redirect(&self, route: AppRoute);

    /// Redirect that remembers `from` as the place to come back to after
    /// signing in. Only for sessions that died under the user, never logout.
    fn redirect_from(&self, route: AppRoute, from: AppRoute) {
        let _ = from;
        self.redirect(route);
    }
}

/// Sends the user to log in after their session died on `current`.
pub(crate) fn expire_to_login<N: Navigator>(navigator: &N, current: AppRoute) {
    let login = AppRoute::auth_failure_redirect();
    if current.requires_auth() {
        navigator.redirect_from(login, current);
    } else {
        navigator.redirect(login);
    }
}

#[cfg(test)]
pub use mock::MockNavigator;

#[cfg(test)]
mod mock {
    use super::{AppRoute, Navigator};
    use std::cell::{Cell, RefCell};

    /// Records redirects instead of touching browser history.
    #[derive(Debug, Default)]
    pub struct MockNavigator {
        route: Cell<AppRoute>,
        pub redirects: RefCell<Vec<AppRoute>>,
        /// `from` of every redirect, `None` for plain ones.
        pub origins: RefCell<Vec<Option<AppRoute>>>,
    }

    impl MockNavigator {
        pub fn at(route: AppRoute) -> Self {
            Self {
                route: Cell::new(route),
                redirects: RefCell::new(Vec::new()),
                origins: RefCell::new(Vec::new()),
            }
        }

        pub fn redirects(&self) -> Vec<AppRoute> {
            self.redirects.borrow().clone()
        }

        pub fn origins(&self) -> Vec<Option<AppRoute>> {
            self.origins.borrow().clone()
        }
    }

    impl Navigator for MockNavigator {
        fn current_route(&self) -> AppRoute {
            self.route.get()
        }

        fn redirect(&self, route: AppRoute) {
            self.route.set(route);
            self.redirects.borrow_mut().push(route);
            self.origins.borrow_mut().push(None);
        }

        fn redirect_from(&self, route: AppRoute, from: AppRoute) {
            self.route.set(route);
            self.redirects.borrow_mut().push(route);
            self.origins.borrow_mut().push(Some(from));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_round_trip() {
        for route in [
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Dashboard,
            AppRoute::Upload,
            AppRoute::Insights,
            AppRoute::AiHelper,
            AppRoute::Reports,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
    }

    #[test]
    fn test_root_and_unknown_paths() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/upload/"), AppRoute::Upload);
        assert_eq!(AppRoute::from_path("/settings"), AppRoute::NotFound);
        assert!(!AppRoute::NotFound.requires_auth());
        assert!(!AppRoute::NotFound.is_public());
    }

    #[test]
    fn test_guard_defers_while_verifying() {
        assert_eq!(guard(AppRoute::Upload, SessionPhase::Verifying), GuardDecision::Defer);
        assert_eq!(guard(AppRoute::Login, SessionPhase::Verifying), GuardDecision::Defer);
    }

    #[test]
    fn test_guard_redirects_anonymous_and_remembers_target() {
        assert_eq!(
            guard(AppRoute::Insights, SessionPhase::Anonymous),
            GuardDecision::Redirect {
                to: AppRoute::Login,
                from: Some(AppRoute::Insights)
            }
        );
        assert_eq!(guard(AppRoute::Register, SessionPhase::Anonymous), GuardDecision::Allow);
    }

    #[test]
    fn test_guard_sends_signed_in_users_home() {
        assert_eq!(
            guard(AppRoute::Login, SessionPhase::Authenticated),
            GuardDecision::Redirect {
                to: AppRoute::Dashboard,
                from: None
            }
        );
        assert_eq!(guard(AppRoute::Reports, SessionPhase::Authenticated), GuardDecision::Allow);
        assert_eq!(guard(AppRoute::NotFound, SessionPhase::Authenticated), GuardDecision::Allow);
    }

    #[test]
    fn test_navigation_state_builders() {
        let state = NavigationState::default()
            .with_from(AppRoute::Upload)
            .with_message("Please log in to upload files");
        assert_eq!(state.from, Some(AppRoute::Upload));
        assert_eq!(state.message.as_deref(), Some("Please log in to upload files"));
        assert!(state.analytics.is_none());
    }
}
