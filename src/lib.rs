//! IntelliDash client core.
//!
//! Everything here is platform-agnostic: the browser app supplies an
//! [`HttpClient`](request::HttpClient), a [`TokenStore`](store::TokenStore)
//! and a [`Navigator`](route::Navigator); native callers and tests use
//! reqwest, memory and mocks.

pub mod api;
pub mod chart;
pub mod chat;
pub mod config;
pub mod error;
pub mod insights;
pub mod request;
pub mod route;
pub mod sequence;
pub mod session;
pub mod store;
pub mod upload;

pub use api::{ApiClient, UploadFile};
pub use config::ClientConfig;
pub use error::{ApiError, LoginError, UploadError};
pub use intellidash_shared as shared;
pub use request::{HttpClient, HttpRequest, HttpResponse, TransportError};
pub use route::{AppRoute, GuardDecision, NavigationState, Navigator};
pub use sequence::{CancelScope, RequestSequencer};
pub use session::{SessionManager, SessionPhase, SessionState};
pub use store::{MemoryTokenStore, TokenStore};

#[cfg(feature = "native")]
pub use request::ReqwestHttpClient;
