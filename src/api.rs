use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use intellidash_shared::protocol::{
    ChartRequest, ChatHistoryRequest, ChatMessageRequest, DeleteFileRequest,
    GenerateReportRequest, GetReportRequest, ListFilesRequest, LoginRequest, MeRequest,
    RegisterRequest, StatsRequest, UploadFileRequest,
};
use intellidash_shared::{
    Analytics, ApiRequest, BEARER_PREFIX, ChartCollection, ChatHistory, ChatReply, Credentials,
    FileList, GenerateReportResponse, HEADER_AUTHORIZATION, LoginResponse, MessageResponse,
    RegisterResponse, Report, Stats, UPLOAD_FIELD_NAME, UploadResponse, User,
};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::request::{HttpClient, HttpMethod, HttpRequest, MultipartForm};
use crate::route::{AppRoute, Navigator, expire_to_login};
use crate::store::TokenStore;

type UnauthorizedHook = Rc<dyn Fn()>;

/// What a 401 on this request means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnUnauthorized {
    /// The stored session is dead: clear it, redirect, fire hooks.
    ExpireSession,
    /// The caller owns the outcome (credential checks, token verification).
    Report,
}

/// A file picked by the user, ready to post.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

struct ClientInner<C, S, N> {
    config: ClientConfig,
    http: C,
    store: S,
    navigator: N,
    unauthorized_hooks: RefCell<Vec<UnauthorizedHook>>,
}

// =========================================================
// 业务逻辑: IntelliDash API 网关
// =========================================================

/// Authenticated access to the IntelliDash HTTP API.
///
/// Clones share one transport, token store and navigator.
pub struct ApiClient<C, S, N> {
    inner: Rc<ClientInner<C, S, N>>,
}

impl<C, S, N> Clone for ApiClient<C, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: HttpClient, S: TokenStore, N: Navigator> ApiClient<C, S, N> {
    pub fn new(config: ClientConfig, http: C, store: S, navigator: N) -> Self {
        Self {
            inner: Rc::new(ClientInner {
                config,
                http,
                store,
                navigator,
                unauthorized_hooks: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn http(&self) -> &C {
        &self.inner.http
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn navigator(&self) -> &N {
        &self.inner.navigator
    }

    pub fn token(&self) -> Option<String> {
        self.inner.store.load().filter(|t| !t.is_empty())
    }

    /// Runs after the client has cleared the token for a 401.
    pub fn on_unauthorized(&self, hook: impl Fn() + 'static) {
        self.inner.unauthorized_hooks.borrow_mut().push(Rc::new(hook));
    }

    // --- Auth ---

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let req = LoginRequest {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        };
        self.send_with(&req, OnUnauthorized::Report).await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        let req = RegisterRequest {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        };
        self.send_with(&req, OnUnauthorized::Report).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.send_with(&MeRequest, OnUnauthorized::Report).await
    }

    // --- Upload ---

    pub async fn upload_file(&self, file: UploadFile) -> Result<UploadResponse, ApiError> {
        let form = MultipartForm::new().with_file(
            UPLOAD_FIELD_NAME,
            &file.name,
            &file.content_type,
            file.bytes,
        );
        let req = self
            .build_request(UploadFileRequest::METHOD, &UploadFileRequest.path())
            .with_multipart(form);
        self.execute(req, OnUnauthorized::ExpireSession).await
    }

    pub async fn list_files(&self) -> Result<FileList, ApiError> {
        self.send(&ListFilesRequest).await
    }

    pub async fn delete_file(&self, name: &str) -> Result<MessageResponse, ApiError> {
        self.send(&DeleteFileRequest {
            name: name.to_string(),
        })
        .await
    }

    // --- Data ---

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.send(&StatsRequest).await
    }

    pub async fn chart(&self, chart_type: &str) -> Result<ChartCollection, ApiError> {
        self.send(&ChartRequest {
            chart_type: chart_type.to_string(),
        })
        .await
    }

    // --- Chat ---

    pub async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.send(&ChatMessageRequest {
            message: message.to_string(),
        })
        .await
    }

    pub async fn chat_history(&self) -> Result<ChatHistory, ApiError> {
        self.send(&ChatHistoryRequest).await
    }

    // --- Report ---

    pub async fn generate_report(
        &self,
        analytics: &Analytics,
    ) -> Result<GenerateReportResponse, ApiError> {
        self.send(&GenerateReportRequest {
            analytics: analytics.clone(),
        })
        .await
    }

    pub async fn get_report(&self, id: &str) -> Result<Report, ApiError> {
        self.send(&GetReportRequest { id: id.to_string() }).await
    }

    // --- Plumbing ---

    /// Sends any protocol request with the default 401 handling.
    pub async fn send<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        self.send_with(request, OnUnauthorized::ExpireSession).await
    }

    async fn send_with<R: ApiRequest>(
        &self,
        request: &R,
        on_unauthorized: OnUnauthorized,
    ) -> Result<R::Response, ApiError> {
        let mut req = self.build_request(R::METHOD, &request.path());
        if R::has_json_body() {
            let body = serde_json::to_string(request).map_err(|e| ApiError::Encode(e.to_string()))?;
            req = req.with_json(body);
        }
        self.execute(req, on_unauthorized).await
    }

    fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut req = HttpRequest::new(&self.inner.config.url(path), method)
            .with_header("Accept", "application/json")
            .with_timeout(self.inner.config.timeout());

        if let Some(token) = self.token() {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("{}{}", BEARER_PREFIX, token));
        }
        req
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req: HttpRequest,
        on_unauthorized: OnUnauthorized,
    ) -> Result<T, ApiError> {
        let method = req.method.as_str();
        let url = req.url.clone();
        log::debug!("API request: {} {}", method, url);

        let resp = match self.inner.http.send(req).await {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("API request failed: {} {}: {}", method, url, err);
                return Err(err.into());
            }
        };

        log::debug!("API response: {} {} -> {}", method, url, resp.status);

        if resp.status == 401 {
            log::warn!("API 401 on {} {}", method, url);
            if on_unauthorized == OnUnauthorized::ExpireSession {
                self.expire_session();
            }
            return Err(ApiError::Unauthorized);
        }

        if !resp.is_success() {
            let err = ApiError::from_status(resp.status, &resp.body);
            if resp.status >= 500 {
                log::error!("API error: {} {}: {}", method, url, err);
            } else {
                log::warn!("API rejected: {} {}: {}", method, url, err);
            }
            return Err(err);
        }

        resp.json::<T>().inspect_err(|err| {
            log::error!("API decode failed: {} {}: {}", method, url, err);
        })
    }

    fn expire_session(&self) {
        self.inner.store.clear();

        let current = self.inner.navigator.current_route();
        if current != AppRoute::Login {
            expire_to_login(&self.inner.navigator, current);
        }

        // Hooks may register further hooks; don't hold the borrow while calling.
        let hooks: Vec<UnauthorizedHook> = self.inner.unauthorized_hooks.borrow().clone();
        for hook in hooks {
            hook();
        }
    }
}

#[cfg(test)]
mod tests;
