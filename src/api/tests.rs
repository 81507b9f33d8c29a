use super::*;
use crate::request::{MockHttpClient, RequestBody, TransportError};
use crate::route::MockNavigator;
use crate::store::MemoryTokenStore;
use serde_json::json;
use std::cell::Cell;

const BASE: &str = "http://api.test";

type TestClient = ApiClient<MockHttpClient, MemoryTokenStore, MockNavigator>;

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn client(route: AppRoute, token: Option<&str>) -> TestClient {
    let store = match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    };
    ApiClient::new(
        ClientConfig::new(BASE),
        MockHttpClient::new(),
        store,
        MockNavigator::at(route),
    )
}

#[tokio::test]
async fn test_no_token_means_no_authorization_header() {
    let api = client(AppRoute::Insights, None);
    api.http().mock_response(&url("/api/data/stats"), 200, json!({"total_sales": 10}));

    api.stats().await.unwrap();

    let req = api.http().last_request().unwrap();
    assert_eq!(req.header("Authorization"), None);
    assert_eq!(req.header("Accept"), Some("application/json"));
}

#[tokio::test]
async fn test_token_sent_as_bearer() {
    let api = client(AppRoute::Insights, Some("abc123"));
    api.http().mock_response(&url("/api/data/stats"), 200, json!({}));

    api.stats().await.unwrap();

    let req = api.http().last_request().unwrap();
    assert_eq!(req.header("Authorization"), Some("Bearer abc123"));
    assert_eq!(req.method, HttpMethod::Get);
}

#[tokio::test]
async fn test_401_clears_token_and_later_requests_are_anonymous() {
    let api = client(AppRoute::Insights, Some("stale"));
    api.http().mock_raw(&url("/api/data/stats"), 401, r#"{"error": "Token expired"}"#);
    api.http().mock_response(&url("/api/upload/list"), 200, json!({"files": []}));

    let hook_calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hook_calls);
    api.on_unauthorized(move || counter.set(counter.get() + 1));

    let err = api.stats().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(err.to_string(), "Session expired. Please log in again.");
    assert_eq!(api.store().load(), None);
    assert_eq!(hook_calls.get(), 1);
    assert_eq!(api.navigator().redirects(), vec![AppRoute::Login]);
    assert_eq!(api.navigator().origins(), vec![Some(AppRoute::Insights)]);

    api.list_files().await.unwrap();
    assert_eq!(api.http().last_request().unwrap().header("Authorization"), None);
}

#[tokio::test]
async fn test_401_on_login_route_does_not_redirect() {
    let api = client(AppRoute::Login, Some("stale"));
    api.http().mock_raw(&url("/api/chat/history"), 401, "");

    api.chat_history().await.unwrap_err();

    assert_eq!(api.store().load(), None);
    assert!(api.navigator().redirects().is_empty());
}

#[tokio::test]
async fn test_credential_401_leaves_session_handling_to_caller() {
    let api = client(AppRoute::Login, None);
    api.http()
        .mock_response(&url("/api/auth/login"), 401, json!({"error": "Invalid credentials"}));

    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    api.on_unauthorized(move || flag.set(true));

    let err = api.login(&Credentials::new("a@b.com", "x")).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(!fired.get());
}

#[tokio::test]
async fn test_login_posts_json_credentials() {
    let api = client(AppRoute::Login, None);
    api.http().mock_response(
        &url("/api/auth/login"),
        200,
        json!({"token": "t1", "user": {"email": "a@b.com"}}),
    );

    let resp = api.login(&Credentials::new("a@b.com", "pw")).await.unwrap();
    assert_eq!(resp.token.as_deref(), Some("t1"));

    let req = api.http().last_request().unwrap();
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    let Some(RequestBody::Json(body)) = req.body else {
        panic!("expected a JSON body");
    };
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"email": "a@b.com", "password": "pw"}));
}

#[tokio::test]
async fn test_rejection_and_server_errors() {
    let api = client(AppRoute::Upload, Some("t"));
    api.http().mock_response(
        &url("/api/report/generate"),
        400,
        json!({"error": "No analytics data provided"}),
    );
    api.http().mock_raw(&url("/api/data/stats"), 502, "Bad Gateway");

    let err = api.generate_report(&Analytics::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "No analytics data provided");

    let err = api.stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 502, .. }));
    assert_eq!(err.user_message(), "Server error. Please try again later.");
    // token survives non-401 failures
    assert_eq!(api.store().load().as_deref(), Some("t"));
}

#[tokio::test]
async fn test_transport_failures_are_normalized() {
    let api = client(AppRoute::Dashboard, None);
    api.http().mock_error(&url("/api/data/stats"), TransportError::Timeout);
    api.http()
        .mock_error(&url("/api/upload/list"), TransportError::Network("connection refused".into()));

    assert_eq!(api.stats().await.unwrap_err(), ApiError::Timeout);
    let err = api.list_files().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to connect to server. Please check your connection."
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let api = client(AppRoute::Dashboard, Some("t"));
    api.http().mock_raw(&url("/api/report/r1"), 200, "<html>");

    let err = api.get_report("r1").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_upload_is_multipart_with_file_field() {
    let api = client(AppRoute::Upload, Some("t"));
    api.http().mock_response(
        &url("/api/upload/file"),
        200,
        json!({"message": "File uploaded successfully", "filename": "s.csv"}),
    );

    let resp = api
        .upload_file(UploadFile {
            name: "s.csv".into(),
            content_type: "text/csv".into(),
            bytes: b"a,b\n1,2\n".to_vec(),
        })
        .await
        .unwrap();
    assert_eq!(resp.filename.as_deref(), Some("s.csv"));

    let req = api.http().last_request().unwrap();
    assert_eq!(req.header("Content-Type"), None);
    let Some(RequestBody::Multipart(form)) = req.body else {
        panic!("expected a multipart body");
    };
    assert_eq!(form.parts.len(), 1);
    assert_eq!(form.parts[0].field, "file");
    assert_eq!(form.parts[0].file_name, "s.csv");
}

#[tokio::test]
async fn test_path_parameters_are_encoded() {
    let api = client(AppRoute::Upload, Some("t"));
    api.http()
        .mock_response(&url("/api/upload/my%20data.csv"), 200, json!({"message": "deleted"}));

    let resp = api.delete_file("my data.csv").await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("deleted"));
    assert_eq!(api.http().last_request().unwrap().method, HttpMethod::Delete);
}
