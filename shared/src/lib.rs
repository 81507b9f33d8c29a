use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod date;
pub mod protocol;

pub use protocol::{ApiRequest, HttpMethod};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";
/// LocalStorage key holding the bearer token.
pub const STORAGE_TOKEN_KEY: &str = "token";
/// Multipart field name the upload endpoint reads the CSV from.
pub const UPLOAD_FIELD_NAME: &str = "file";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// Account as returned by `/api/auth/login` and `/api/auth/me`.
///
/// Only `email` is guaranteed; anything else the backend sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            id: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful `/api/auth/login` body. `token` stays optional so a malformed
/// 2xx can be told apart from a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Error payload of any non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------
// Upload
// ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UploadStats {
    #[serde(default)]
    pub rows: u64,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub sample_data: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub stats: Option<UploadStats>,
    /// Some deployments return the analytics summary directly.
    #[serde(default)]
    pub analytics: Option<Analytics>,
}

impl UploadResponse {
    /// Analytics to hand to the report view.
    ///
    /// Prefers the backend's own summary; otherwise derives one from `stats`,
    /// typing each column by the JSON type of its first sample value.
    pub fn analytics(&self) -> Option<Analytics> {
        if let Some(analytics) = &self.analytics {
            return Some(analytics.clone());
        }
        let stats = self.stats.as_ref()?;
        let first_row = stats.sample_data.first();
        let features = stats
            .columns
            .iter()
            .map(|name| Feature {
                name: name.clone(),
                kind: first_row
                    .and_then(|row| row.get(name))
                    .map(json_type_name)
                    .unwrap_or("unknown")
                    .to_string(),
            })
            .collect();
        Some(Analytics {
            total_records: stats.rows,
            features,
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "numeric",
        Value::String(_) => "text",
        Value::Bool(_) => "boolean",
        Value::Null => "unknown",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub uploaded_at: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl FileList {
    /// Newest first, truncated to `limit`.
    pub fn recent(&self, limit: usize) -> Vec<FileEntry> {
        let mut files = self.files.clone();
        files.sort_by(|a, b| b.uploaded_at.total_cmp(&a.uploaded_at));
        files.truncate(limit);
        files
    }
}

// ---------------------------------------------------------
// Analytics / report
// ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Analytics {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// KPI name to value, rendered as-is.
pub type Stats = Map<String, Value>;

/// Chart title to a Chart.js-like spec.
pub type ChartCollection = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReportResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub report_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ---------------------------------------------------------
// Chat
// ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatReply {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatReply {
    /// `answer` when present, else the acknowledgement `message`.
    pub fn text(&self) -> Option<&str> {
        self.answer.as_deref().or(self.message.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    #[serde(default)]
    pub user: Option<String>,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<ChatHistoryEntry>,
}
