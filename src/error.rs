use thiserror::Error;

use intellidash_shared::ErrorBody;

use crate::request::TransportError;

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Errors produced by [`crate::api::ApiClient`].
///
/// `Display` is the text shown to the user, except for `Server`, whose
/// details only go to the log (see [`ApiError::user_message`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Connection timeout. Please check if the server is running.")]
    Timeout,
    /// The detail is for logs; the displayed text is fixed.
    #[error("Unable to connect to server. Please check your connection.")]
    Network(String),
    #[error("Session expired. Please log in again.")]
    Unauthorized,
    #[error("{}", .message.as_deref().unwrap_or("The request was rejected."))]
    Rejected { status: u16, message: Option<String> },
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("Could not encode request: {0}")]
    Encode(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Request superseded by a newer one")]
    Superseded,
}

impl ApiError {
    /// Classifies a non-2xx, non-401 response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = backend_message(body);
        if status >= 500 {
            ApiError::Server { status, message }
        } else {
            ApiError::Rejected { status, message }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Rejected { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `{error}` text the backend sent, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } | ApiError::Server { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// True for errors a page should swallow silently.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled | ApiError::Superseded)
    }

    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// `{error}` / `{message}` from a JSON body, else the trimmed raw text.
fn backend_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(text) = parsed.text() {
            return Some(text.to_string());
        }
    }
    let raw = body.trim();
    // Not an object we understood; don't echo JSON or HTML pages at the user
    if raw.is_empty() || raw.starts_with('{') || raw.starts_with('<') {
        None
    } else {
        Some(raw.to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ApiError::Timeout,
            TransportError::Network(detail) => ApiError::Network(detail),
            TransportError::Aborted => ApiError::Cancelled,
        }
    }
}

/// Why a login or registration attempt failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoginError {
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    #[error("{0}")]
    BadRequest(String),
    #[error("Server error. Please try again later.")]
    Server,
    #[error("{0}")]
    Network(String),
    #[error("Login failed. Please try again.")]
    InvalidResponse,
    #[error("An error occurred. Please try again.")]
    Other,
    #[error("Request superseded by a newer one")]
    Superseded,
}

const INVALID_LOGIN_DATA: &str = "Invalid login data. Please check your input.";

impl LoginError {
    pub fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => LoginError::InvalidCredentials,
            ApiError::Rejected { status: 400, message } => {
                LoginError::BadRequest(message.unwrap_or_else(|| INVALID_LOGIN_DATA.to_string()))
            }
            ApiError::Server { .. } => LoginError::Server,
            err @ (ApiError::Timeout | ApiError::Network(_)) => LoginError::Network(err.to_string()),
            ApiError::Decode(_) => LoginError::InvalidResponse,
            ApiError::Cancelled | ApiError::Superseded => LoginError::Superseded,
            ApiError::Rejected { .. } | ApiError::Encode(_) => LoginError::Other,
        }
    }

    /// Registration surfaces any 4xx text verbatim ("User already exists").
    pub fn from_register(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message: Some(message), .. } => LoginError::BadRequest(message),
            other => Self::from_login(other),
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, LoginError::Superseded)
    }
}

/// Client-side upload validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please upload a CSV file")]
    NotCsv,
    #[error("Please select a file to upload")]
    NoFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_reads_error_payload() {
        let err = ApiError::from_status(400, r#"{"error": "Email and password are required"}"#);
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 400,
                message: Some("Email and password are required".to_string())
            }
        );
        assert_eq!(err.to_string(), "Email and password are required");

        let err = ApiError::from_status(503, "upstream down");
        assert_eq!(err.backend_message(), Some("upstream down"));
        assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn test_from_status_hides_markup() {
        let err = ApiError::from_status(404, "<html>Not Found</html>");
        assert_eq!(err.backend_message(), None);
        assert_eq!(err.to_string(), "The request was rejected.");
    }

    #[test]
    fn test_transport_errors_map_to_fixed_messages() {
        assert_eq!(
            ApiError::from(TransportError::Timeout).to_string(),
            "Connection timeout. Please check if the server is running."
        );
        assert_eq!(
            ApiError::from(TransportError::Network("refused".into())).to_string(),
            "Unable to connect to server. Please check your connection."
        );
        assert!(ApiError::from(TransportError::Aborted).is_cancelled());
    }

    #[test]
    fn test_login_classification() {
        assert!(
            LoginError::from_login(ApiError::Unauthorized)
                .to_string()
                .starts_with("Invalid email or password.")
        );
        assert_eq!(
            LoginError::from_login(ApiError::Rejected { status: 400, message: None }).to_string(),
            INVALID_LOGIN_DATA
        );
        assert_eq!(
            LoginError::from_login(ApiError::Server { status: 500, message: None }),
            LoginError::Server
        );
        assert_eq!(
            LoginError::from_login(ApiError::Rejected { status: 409, message: Some("x".into()) }),
            LoginError::Other
        );
        assert_eq!(
            LoginError::from_login(ApiError::Timeout).to_string(),
            ApiError::Timeout.to_string()
        );
    }

    #[test]
    fn test_register_surfaces_backend_text() {
        let err = LoginError::from_register(ApiError::Rejected {
            status: 409,
            message: Some("User already exists".into()),
        });
        assert_eq!(err.to_string(), "User already exists");
    }
}
