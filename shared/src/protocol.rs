use crate::{
    Analytics, ChartCollection, ChatHistory, ChatReply, FileList, GenerateReportResponse,
    LoginResponse, MessageResponse, RegisterResponse, Report, Stats, UploadResponse, User,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path, or the prefix of it for endpoints with a path parameter.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// Full path for this request. Endpoints with a path parameter override this.
    fn path(&self) -> String {
        Self::PATH.to_string()
    }

    /// Whether the request itself is sent as the JSON body.
    fn has_json_body() -> bool {
        Self::METHOD == HttpMethod::Post
    }
}

fn with_segment(prefix: &str, segment: &str) -> String {
    format!("{}/{}", prefix, urlencoding::encode(segment))
}

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const PATH: &'static str = "/api/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;
    const PATH: &'static str = "/api/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// Verify the stored token and fetch the account behind it.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeRequest;

impl ApiRequest for MeRequest {
    type Response = User;
    const PATH: &'static str = "/api/auth/me";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Upload
// =========================================================

/// Multipart upload. The body is built by the client, never serialized from this type.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadFileRequest;

impl ApiRequest for UploadFileRequest {
    type Response = UploadResponse;
    const PATH: &'static str = "/api/upload/file";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn has_json_body() -> bool {
        false
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListFilesRequest;

impl ApiRequest for ListFilesRequest {
    type Response = FileList;
    const PATH: &'static str = "/api/upload/list";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFileRequest {
    pub name: String,
}

impl ApiRequest for DeleteFileRequest {
    type Response = MessageResponse;
    const PATH: &'static str = "/api/upload";
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        with_segment(Self::PATH, &self.name)
    }
}

// =========================================================
// Data
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsRequest;

impl ApiRequest for StatsRequest {
    type Response = Stats;
    const PATH: &'static str = "/api/data/stats";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartRequest {
    pub chart_type: String,
}

impl ApiRequest for ChartRequest {
    type Response = ChartCollection;
    const PATH: &'static str = "/api/data/chart";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_segment(Self::PATH, &self.chart_type)
    }
}

// =========================================================
// Chat
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
}

impl ApiRequest for ChatMessageRequest {
    type Response = ChatReply;
    const PATH: &'static str = "/api/chat/message";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatHistoryRequest;

impl ApiRequest for ChatHistoryRequest {
    type Response = ChatHistory;
    const PATH: &'static str = "/api/chat/history";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Report
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReportRequest {
    pub analytics: Analytics,
}

impl ApiRequest for GenerateReportRequest {
    type Response = GenerateReportResponse;
    const PATH: &'static str = "/api/report/generate";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetReportRequest {
    pub id: String,
}

impl ApiRequest for GetReportRequest {
    type Response = Report;
    const PATH: &'static str = "/api/report";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_segment(Self::PATH, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths() {
        assert_eq!(MeRequest.path(), "/api/auth/me");
        assert_eq!(StatsRequest.path(), "/api/data/stats");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let req = DeleteFileRequest { name: "q1 sales/eu.csv".to_string() };
        assert_eq!(req.path(), "/api/upload/q1%20sales%2Feu.csv");

        let req = ChartRequest { chart_type: "all".to_string() };
        assert_eq!(req.path(), "/api/data/chart/all");

        let req = GetReportRequest { id: "12".to_string() };
        assert_eq!(req.path(), "/api/report/12");
    }

    #[test]
    fn test_body_rules() {
        assert!(LoginRequest::has_json_body());
        assert!(!MeRequest::has_json_body());
        assert!(!DeleteFileRequest::has_json_body());
        assert!(!UploadFileRequest::has_json_body());
    }
}
