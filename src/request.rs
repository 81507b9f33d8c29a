use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::error::ApiError;

pub use intellidash_shared::HttpMethod;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// One file in a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartForm {
    pub parts: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(
        mut self,
        field: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FilePart {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(String),
    /// The transport sets the multipart Content-Type (with boundary) itself.
    Multipart(MultipartForm),
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_json(mut self, body: String) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body. An empty body is read as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = if self.body.trim().is_empty() {
            "{}"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Failure before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("request aborted")]
    Aborted,
}

/// HTTP 客户端特性 (Trait)
/// (?Send) because browser fetch futures hold JS values.
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =========================================================
// 实现层: reqwest 客户端 (native)
// =========================================================

#[cfg(feature = "native")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[cfg(feature = "native")]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "native")]
fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

#[cfg(feature = "native")]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &req.url);

        for (k, v) in &req.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        if let Some(timeout) = req.timeout {
            builder = builder.timeout(timeout);
        }

        match req.body {
            Some(RequestBody::Json(body)) => {
                builder = builder.body(body);
            }
            Some(RequestBody::Multipart(form)) => {
                let mut multipart = reqwest::multipart::Form::new();
                for part in form.parts {
                    let file = reqwest::multipart::Part::bytes(part.bytes)
                        .file_name(part.file_name)
                        .mime_str(&part.content_type)
                        .map_err(classify_reqwest_error)?;
                    multipart = multipart.part(part.field, file);
                }
                builder = builder.multipart(multipart);
            }
            None => {}
        }

        let resp = builder.send().await.map_err(classify_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub enum MockReply {
    Respond(u16, String),
    Fail(TransportError),
    /// Resolves once the test sends `(status, body)` through the channel.
    Deferred(futures::channel::oneshot::Receiver<(u16, String)>),
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
}

#[cfg(test)]
impl RecordedRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
pub struct MockHttpClient {
    // URL -> queued replies; the last plain reply is reused for later calls
    replies: RefCell<HashMap<String, VecDeque<MockReply>>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            replies: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.push(url, MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_raw(&self, url: &str, status: u16, body: &str) {
        self.push(url, MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_error(&self, url: &str, err: TransportError) {
        self.push(url, MockReply::Fail(err));
    }

    pub fn mock_deferred(&self, url: &str) -> futures::channel::oneshot::Sender<(u16, String)> {
        let (tx, rx) = futures::channel::oneshot::channel();
        self.push(url, MockReply::Deferred(rx));
        tx
    }

    pub fn push(&self, url: &str, reply: MockReply) {
        self.replies
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn next_reply(&self, url: &str) -> Option<MockReply> {
        let mut replies = self.replies.borrow_mut();
        let queue = replies.get_mut(url)?;
        if queue.len() > 1 {
            return queue.pop_front();
        }
        match queue.front()? {
            MockReply::Respond(status, body) => Some(MockReply::Respond(*status, body.clone())),
            MockReply::Fail(err) => Some(MockReply::Fail(err.clone())),
            MockReply::Deferred(_) => queue.pop_front(),
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: req.url.clone(),
            method: req.method,
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        // The RefCell borrow must end before awaiting a deferred reply.
        let reply = self.next_reply(&req.url);
        match reply {
            Some(MockReply::Respond(status, body)) => Ok(HttpResponse { status, body }),
            Some(MockReply::Fail(err)) => Err(err),
            Some(MockReply::Deferred(rx)) => match rx.await {
                Ok((status, body)) => Ok(HttpResponse { status, body }),
                Err(_) => Err(TransportError::Aborted),
            },
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = HttpRequest::new("http://x/api", HttpMethod::Get).with_header("Authorization", "Bearer t");
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("Accept"), None);
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let req = HttpRequest::new("http://x/api", HttpMethod::Post).with_json("{}".to_string());
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body, Some(RequestBody::Json("{}".to_string())));
    }

    #[test]
    fn test_multipart_body_leaves_content_type_to_transport() {
        let form = MultipartForm::new().with_file("file", "a.csv", "text/csv", b"x,y".to_vec());
        let req = HttpRequest::new("http://x/api", HttpMethod::Post).with_multipart(form);
        assert_eq!(req.header("Content-Type"), None);
    }

    #[test]
    fn test_empty_body_parses_as_object() {
        let resp = HttpResponse { status: 200, body: String::new() };
        let parsed: intellidash_shared::MessageResponse = resp.json().unwrap();
        assert_eq!(parsed.message, None);

        let resp = HttpResponse { status: 200, body: "not json".to_string() };
        let err = resp.json::<intellidash_shared::MessageResponse>().unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_mock_reuses_last_reply() {
        let mock = MockHttpClient::new();
        mock.mock_response("http://x/a", 500, serde_json::json!({}));
        mock.mock_response("http://x/a", 200, serde_json::json!({}));

        let first = mock.send(HttpRequest::new("http://x/a", HttpMethod::Get)).await.unwrap();
        let second = mock.send(HttpRequest::new("http://x/a", HttpMethod::Get)).await.unwrap();
        let third = mock.send(HttpRequest::new("http://x/a", HttpMethod::Get)).await.unwrap();
        assert_eq!((first.status, second.status, third.status), (500, 200, 200));
        assert_eq!(mock.request_count(), 3);
    }
}
