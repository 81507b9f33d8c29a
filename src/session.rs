//! 会话模块 - 登录状态的唯一来源
//!
//! `SessionManager` owns the token/user pair and walks it through
//! `Anonymous -> Verifying -> Authenticated`. Any 401 from the API client,
//! or an explicit logout, drops it back to `Anonymous`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use intellidash_shared::{Credentials, LoginResponse, User};

use crate::api::ApiClient;
use crate::error::LoginError;
use crate::request::HttpClient;
use crate::route::{AppRoute, Navigator, expire_to_login};
use crate::sequence::RequestSequencer;
use crate::store::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    /// A stored token is being checked against `/api/auth/me`.
    Verifying,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub phase: SessionPhase,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn verifying(token: String) -> Self {
        Self {
            user: None,
            token: Some(token),
            phase: SessionPhase::Verifying,
        }
    }

    pub fn authenticated(token: String, user: User) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            phase: SessionPhase::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.user.is_some() && self.token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Verifying
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}

type Listener = Rc<dyn Fn(&SessionState)>;

#[derive(Default)]
struct Shared {
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<Listener>>,
    return_to: Cell<Option<AppRoute>>,
}

impl Shared {
    fn set(&self, next: SessionState) {
        if *self.state.borrow() == next {
            return;
        }
        log::info!("Session phase: {:?}", next.phase);
        *self.state.borrow_mut() = next.clone();

        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&next);
        }
    }
}

/// 会话管理器
pub struct SessionManager<C, S, N> {
    api: ApiClient<C, S, N>,
    shared: Rc<Shared>,
    sequencer: Rc<RequestSequencer>,
}

impl<C, S, N> Clone for SessionManager<C, S, N> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            shared: Rc::clone(&self.shared),
            sequencer: Rc::clone(&self.sequencer),
        }
    }
}

impl<C: HttpClient, S: TokenStore, N: Navigator> SessionManager<C, S, N> {
    pub fn new(api: ApiClient<C, S, N>) -> Self {
        let initial = match api.token() {
            Some(token) => SessionState::verifying(token),
            None => SessionState::anonymous(),
        };
        let shared = Rc::new(Shared {
            state: RefCell::new(initial),
            ..Shared::default()
        });
        let sequencer = Rc::new(RequestSequencer::new());

        // Weak: the client must not keep the session alive.
        let weak = Rc::downgrade(&shared);
        let seq = Rc::clone(&sequencer);
        api.on_unauthorized(move || {
            if let Some(shared) = weak.upgrade() {
                seq.invalidate();
                shared.set(SessionState::anonymous());
            }
        });

        Self {
            api,
            shared,
            sequencer,
        }
    }

    pub fn api(&self) -> &ApiClient<C, S, N> {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionState) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Where the next successful login should land.
    pub fn remember_return_route(&self, route: AppRoute) {
        if route.requires_auth() {
            self.shared.return_to.set(Some(route));
        }
    }

    /// Verifies a stored token. Call once on startup.
    pub async fn restore(&self) -> SessionState {
        let Some(token) = self.api.token() else {
            self.shared.set(SessionState::anonymous());
            return self.state();
        };

        let ticket = self.sequencer.begin();
        self.shared.set(SessionState::verifying(token.clone()));

        let result = self.api.me().await;
        if !self.sequencer.is_current(ticket) {
            log::info!("Dropping superseded token verification");
            return self.state();
        }

        match result {
            Ok(user) => {
                log::info!("Session restored for {}", user.email);
                self.shared.set(SessionState::authenticated(token, user));
            }
            Err(err) => {
                log::warn!("Token verification failed: {}", err);
                self.clear();
                let current = self.api.navigator().current_route();
                if !current.is_public() {
                    expire_to_login(self.api.navigator(), current);
                }
            }
        }
        self.state()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionState, LoginError> {
        let ticket = self.sequencer.begin();
        log::info!("Logging in as {}", email);

        let result = self.api.login(&Credentials::new(email, password)).await;
        if !self.sequencer.is_current(ticket) {
            log::info!("Dropping superseded login response for {}", email);
            return Err(LoginError::Superseded);
        }

        match result {
            Ok(LoginResponse {
                token: Some(token),
                user,
            }) if !token.is_empty() => {
                let user = user.unwrap_or_else(|| User::new(email));
                self.api.store().save(&token);
                let next = SessionState::authenticated(token, user);
                self.shared.set(next.clone());

                let landing = self
                    .shared
                    .return_to
                    .take()
                    .unwrap_or(AppRoute::auth_success_redirect());
                self.api.navigator().redirect(landing);
                Ok(next)
            }
            Ok(_) => {
                log::error!("Login response for {} carried no token", email);
                self.clear();
                Err(LoginError::InvalidResponse)
            }
            Err(err) => {
                log::warn!("Login failed for {}: {}", email, err);
                self.clear();
                Err(LoginError::from_login(err))
            }
        }
    }

    /// Creates the account, then logs in with the same credentials.
    pub async fn register(&self, email: &str, password: &str) -> Result<SessionState, LoginError> {
        let ticket = self.sequencer.begin();
        log::info!("Registering {}", email);

        let result = self.api.register(&Credentials::new(email, password)).await;
        if !self.sequencer.is_current(ticket) {
            return Err(LoginError::Superseded);
        }
        if let Err(err) = result {
            log::warn!("Registration failed for {}: {}", email, err);
            return Err(LoginError::from_register(err));
        }

        self.login(email, password).await
    }

    pub fn logout(&self) {
        log::info!("Logging out");
        self.sequencer.invalidate();
        self.shared.return_to.set(None);
        self.clear();

        let navigator = self.api.navigator();
        if navigator.current_route() != AppRoute::Login {
            navigator.redirect(AppRoute::auth_failure_redirect());
        }
    }

    fn clear(&self) {
        self.api.store().clear();
        self.shared.set(SessionState::anonymous());
    }
}

#[cfg(test)]
mod tests;
