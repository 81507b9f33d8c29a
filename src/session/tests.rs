use super::*;
use crate::config::ClientConfig;
use crate::request::MockHttpClient;
use crate::route::MockNavigator;
use crate::store::MemoryTokenStore;
use serde_json::json;

const BASE: &str = "http://api.test";
const LOGIN: &str = "http://api.test/api/auth/login";
const REGISTER: &str = "http://api.test/api/auth/register";
const ME: &str = "http://api.test/api/auth/me";

type TestSession = SessionManager<MockHttpClient, MemoryTokenStore, MockNavigator>;

fn session(route: AppRoute, token: Option<&str>) -> TestSession {
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    };
    let api = ApiClient::new(
        ClientConfig::new(BASE),
        MockHttpClient::new(),
        store,
        MockNavigator::at(route),
    );
    SessionManager::new(api)
}

fn login_ok(token: &str, email: &str) -> serde_json::Value {
    json!({"token": token, "user": {"email": email}})
}

#[test]
fn test_initial_phase_follows_stored_token() {
    assert_eq!(session(AppRoute::Login, None).state().phase, SessionPhase::Anonymous);
    let s = session(AppRoute::Dashboard, Some("t"));
    assert_eq!(s.state().phase, SessionPhase::Verifying);
    assert!(s.state().is_loading());
}

#[tokio::test]
async fn test_login_success_stores_token_and_lands_on_dashboard() {
    let s = session(AppRoute::Login, None);
    s.api().http().mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));

    let state = s.login("a@b.com", "pw").await.unwrap();

    assert!(state.is_authenticated());
    assert_eq!(state.email(), Some("a@b.com"));
    assert_eq!(s.api().store().load().as_deref(), Some("tok"));
    assert_eq!(s.api().navigator().redirects(), vec![AppRoute::Dashboard]);
}

#[tokio::test]
async fn test_login_401_leaves_no_token() {
    let s = session(AppRoute::Login, Some("old"));
    s.api()
        .http()
        .mock_response(LOGIN, 401, json!({"error": "Invalid credentials"}));

    let err = s.login("a@b.com", "x").await.unwrap_err();

    assert_eq!(err, LoginError::InvalidCredentials);
    assert!(err.to_string().starts_with("Invalid email or password."));
    assert_eq!(s.api().store().load(), None);
    assert_eq!(s.state(), SessionState::anonymous());
    assert!(s.api().navigator().redirects().is_empty());
}

#[tokio::test]
async fn test_login_without_token_is_invalid_response() {
    let s = session(AppRoute::Login, None);
    s.api()
        .http()
        .mock_response(LOGIN, 200, json!({"user": {"email": "a@b.com"}}));

    let err = s.login("a@b.com", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed. Please try again.");
    assert!(!s.state().is_authenticated());
}

#[tokio::test]
async fn test_login_400_uses_backend_message() {
    let s = session(AppRoute::Login, None);
    s.api()
        .http()
        .mock_response(LOGIN, 400, json!({"error": "Email and password are required"}));

    let err = s.login("", "").await.unwrap_err();
    assert_eq!(err, LoginError::BadRequest("Email and password are required".into()));
}

#[tokio::test]
async fn test_register_then_login_matches_direct_login() {
    let registered = session(AppRoute::Register, None);
    registered.api().http().mock_response(
        REGISTER,
        201,
        json!({"message": "User created successfully", "user": {"email": "a@b.com"}}),
    );
    registered
        .api()
        .http()
        .mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));

    let direct = session(AppRoute::Login, None);
    direct
        .api()
        .http()
        .mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));

    let via_register = registered.register("a@b.com", "pw").await.unwrap();
    let via_login = direct.login("a@b.com", "pw").await.unwrap();

    assert_eq!(via_register, via_login);
    assert_eq!(registered.state(), direct.state());
    assert_eq!(registered.api().http().request_count(), 2);
}

#[tokio::test]
async fn test_register_conflict_is_shown_verbatim() {
    let s = session(AppRoute::Register, None);
    s.api()
        .http()
        .mock_response(REGISTER, 409, json!({"error": "User already exists"}));

    let err = s.register("a@b.com", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "User already exists");
    // no login attempted
    assert_eq!(s.api().http().request_count(), 1);
}

#[tokio::test]
async fn test_logout_on_login_route_does_not_redirect() {
    let s = session(AppRoute::Login, Some("t"));
    s.logout();

    assert!(s.api().navigator().redirects().is_empty());
    assert_eq!(s.api().store().load(), None);
    assert_eq!(s.state().phase, SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_logout_elsewhere_redirects_once() {
    let s = session(AppRoute::Login, None);
    s.api().http().mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));
    s.login("a@b.com", "pw").await.unwrap();

    s.logout();
    s.logout();

    assert_eq!(
        s.api().navigator().redirects(),
        vec![AppRoute::Dashboard, AppRoute::Login]
    );
}

#[tokio::test]
async fn test_restore_hydrates_user() {
    let s = session(AppRoute::Upload, Some("tok"));
    s.api().http().mock_response(ME, 200, json!({"email": "a@b.com"}));

    let state = s.restore().await;

    assert!(state.is_authenticated());
    assert_eq!(state.token.as_deref(), Some("tok"));
    assert_eq!(s.api().http().last_request().unwrap().header("Authorization"), Some("Bearer tok"));
}

#[tokio::test]
async fn test_restore_failure_on_protected_route_redirects() {
    let s = session(AppRoute::Insights, Some("bad"));
    s.api().http().mock_response(ME, 401, json!({"error": "Invalid token"}));

    let state = s.restore().await;

    assert_eq!(state.phase, SessionPhase::Anonymous);
    assert_eq!(s.api().store().load(), None);
    assert_eq!(s.api().navigator().redirects(), vec![AppRoute::Login]);
}

#[tokio::test]
async fn test_restore_failure_on_public_route_stays() {
    let s = session(AppRoute::Register, Some("bad"));
    s.api().http().mock_raw(ME, 500, "");

    s.restore().await;

    assert!(s.api().navigator().redirects().is_empty());
    assert_eq!(s.state().phase, SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_restore_without_token_makes_no_request() {
    let s = session(AppRoute::Login, None);
    let state = s.restore().await;
    assert_eq!(state, SessionState::anonymous());
    assert_eq!(s.api().http().request_count(), 0);
}

#[tokio::test]
async fn test_superseded_login_does_not_change_state() {
    let s = session(AppRoute::Login, None);
    let first_reply = s.api().http().mock_deferred(LOGIN);
    s.api().http().mock_response(LOGIN, 200, login_ok("second", "b@b.com"));

    let first = s.login("a@b.com", "pw");
    let second = async {
        let result = s.login("b@b.com", "pw").await;
        // release the older request only after the newer one settled
        let _ = first_reply.send((200, login_ok("first", "a@b.com").to_string()));
        result
    };
    let (first, second) = futures::join!(first, second);

    assert_eq!(first.unwrap_err(), LoginError::Superseded);
    assert_eq!(second.unwrap().email(), Some("b@b.com"));
    assert_eq!(s.state().token.as_deref(), Some("second"));
    assert_eq!(s.api().store().load().as_deref(), Some("second"));
}

#[tokio::test]
async fn test_return_route_used_once() {
    let s = session(AppRoute::Login, None);
    s.api().http().mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));
    s.remember_return_route(AppRoute::Upload);

    s.login("a@b.com", "pw").await.unwrap();
    s.login("a@b.com", "pw").await.unwrap();

    assert_eq!(
        s.api().navigator().redirects(),
        vec![AppRoute::Upload, AppRoute::Dashboard]
    );
}

#[tokio::test]
async fn test_data_401_moves_session_to_anonymous() {
    let s = session(AppRoute::Login, None);
    s.api().http().mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));
    s.api()
        .http()
        .mock_response("http://api.test/api/data/stats", 401, json!({"error": "expired"}));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    s.subscribe(move |state| sink.borrow_mut().push(state.phase));

    s.login("a@b.com", "pw").await.unwrap();
    s.api().stats().await.unwrap_err();

    assert_eq!(s.state(), SessionState::anonymous());
    assert_eq!(
        *seen.borrow(),
        vec![SessionPhase::Authenticated, SessionPhase::Anonymous]
    );
}

/// What the login page does with the `from` of the redirect that brought it up.
fn remember_origin(s: &TestSession) {
    if let Some(Some(from)) = s.api().navigator().origins().last().copied() {
        s.remember_return_route(from);
    }
}

#[tokio::test]
async fn test_login_after_logout_lands_on_dashboard() {
    let s = session(AppRoute::Login, None);
    s.api().http().mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));
    s.login("a@b.com", "pw").await.unwrap();
    s.api().navigator().redirect(AppRoute::Upload);

    s.logout();
    assert_eq!(s.api().navigator().origins().last(), Some(&None));
    remember_origin(&s);

    s.login("a@b.com", "pw").await.unwrap();
    assert_eq!(s.api().navigator().redirects().last(), Some(&AppRoute::Dashboard));
}

#[tokio::test]
async fn test_login_after_expiry_returns_to_page() {
    let s = session(AppRoute::Login, None);
    s.api().http().mock_response(LOGIN, 200, login_ok("tok", "a@b.com"));
    s.api()
        .http()
        .mock_response("http://api.test/api/upload/list", 401, json!({"error": "expired"}));
    s.login("a@b.com", "pw").await.unwrap();
    s.api().navigator().redirect(AppRoute::Upload);

    s.api().list_files().await.unwrap_err();
    assert_eq!(s.api().navigator().origins().last(), Some(&Some(AppRoute::Upload)));
    remember_origin(&s);

    s.login("a@b.com", "pw").await.unwrap();
    assert_eq!(s.api().navigator().redirects().last(), Some(&AppRoute::Upload));
}

#[tokio::test]
async fn test_late_verification_does_not_override_login() {
    let s = session(AppRoute::Login, Some("old"));
    let me_reply = s.api().http().mock_deferred(ME);
    s.api().http().mock_response(LOGIN, 200, login_ok("new", "b@b.com"));

    let restore = s.restore();
    let login = async {
        let result = s.login("b@b.com", "pw").await;
        let _ = me_reply.send((401, json!({"error": "Invalid token"}).to_string()));
        result
    };
    let (_, login) = futures::join!(restore, login);

    assert!(login.unwrap().is_authenticated());
    assert!(s.state().is_authenticated());
    assert_eq!(s.state().token.as_deref(), Some("new"));
    assert_eq!(s.api().store().load().as_deref(), Some("new"));
    assert_eq!(s.api().navigator().redirects(), vec![AppRoute::Dashboard]);
}

#[tokio::test]
async fn test_logout_supersedes_in_flight_login() {
    let s = session(AppRoute::Login, None);
    let login_reply = s.api().http().mock_deferred(LOGIN);

    let login = s.login("a@b.com", "pw");
    let logout = async {
        s.logout();
        let _ = login_reply.send((200, login_ok("tok", "a@b.com").to_string()));
    };
    let (login, ()) = futures::join!(login, logout);

    assert_eq!(login.unwrap_err(), LoginError::Superseded);
    assert_eq!(s.api().store().load(), None);
    assert_eq!(s.state(), SessionState::anonymous());
    assert!(s.api().navigator().redirects().is_empty());
}
