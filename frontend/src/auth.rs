//! 认证模块
//!
//! 把核心库的 `SessionManager` 接入 Leptos：会话状态镜像到一个信号里，
//! 路由服务只依赖由它派生的会话阶段信号。

use intellidash::{ApiClient, ClientConfig, LoginError, SessionManager, SessionState};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::web::router::{BrowserNavigator, RouterService};
use crate::web::{BrowserTokenStore, FetchHttpClient};

pub type Api = ApiClient<FetchHttpClient, BrowserTokenStore, BrowserNavigator>;
pub type Session = SessionManager<FetchHttpClient, BrowserTokenStore, BrowserNavigator>;

/// 认证上下文
///
/// `Copy`，可以放进任何视图闭包。会话本身不是 `Send`，存放在本地 arena 中。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话状态（镜像）
    pub state: RwSignal<SessionState>,
    session: StoredValue<Session, LocalStorage>,
}

impl AuthContext {
    /// `state` must be the signal the router's phase was derived from.
    pub fn new(state: RwSignal<SessionState>, router: RouterService) -> Self {
        let config = ClientConfig::from_env();
        log::info!("API base URL: {}", config.base_url());

        let api = ApiClient::new(
            config,
            FetchHttpClient,
            BrowserTokenStore,
            BrowserNavigator(router),
        );
        let session = SessionManager::new(api);

        state.set(session.state());
        session.subscribe(move |next| state.set(next.clone()));

        Self {
            state,
            session: StoredValue::new_local(session),
        }
    }

    pub fn session(&self) -> Session {
        self.session.get_value()
    }

    pub fn api(&self) -> Api {
        self.session.with_value(|s| s.api().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(SessionState::is_authenticated)
    }

    pub fn email(&self) -> Option<String> {
        self.state.with(|s| s.email().map(str::to_string))
    }

    /// 启动时校验已存储的令牌
    pub fn restore(&self) {
        let session = self.session();
        spawn_local(async move {
            session.restore().await;
        });
    }

    pub async fn login(&self, email: String, password: String) -> Result<(), LoginError> {
        self.session().login(&email, &password).await.map(|_| ())
    }

    pub async fn register(&self, email: String, password: String) -> Result<(), LoginError> {
        self.session().register(&email, &password).await.map(|_| ())
    }

    /// 注销；导航由会话层完成
    pub fn logout(&self) {
        self.session().logout();
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}
