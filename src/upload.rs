//! CSV upload: validation, preview and what to do with the server's answer.

use intellidash_shared::UploadResponse;

use crate::api::UploadFile;
use crate::error::{ApiError, UploadError};
use crate::route::{AppRoute, NavigationState};

pub const PREVIEW_LINES: usize = 6;
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully!";
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to upload files";
pub const UPLOAD_FAILED_MESSAGE: &str = "Error uploading file. Please try again.";

const CSV_MIME: &str = "text/csv";

/// A file the user picked that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CsvFile {
    /// Accepts `text/csv` or a `.csv` name (browsers report CSV MIME types inconsistently).
    pub fn new(name: &str, content_type: &str, bytes: Vec<u8>) -> Result<Self, UploadError> {
        if !is_csv(name, content_type) {
            return Err(UploadError::NotCsv);
        }
        let content_type = if content_type.is_empty() {
            CSV_MIME
        } else {
            content_type
        };
        Ok(Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn preview(&self) -> String {
        preview(&String::from_utf8_lossy(&self.bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl From<CsvFile> for UploadFile {
    fn from(file: CsvFile) -> Self {
        UploadFile {
            name: file.name,
            content_type: file.content_type,
            bytes: file.bytes,
        }
    }
}

pub fn is_csv(name: &str, content_type: &str) -> bool {
    content_type.eq_ignore_ascii_case(CSV_MIME) || name.to_ascii_lowercase().ends_with(".csv")
}

/// The first [`PREVIEW_LINES`] `\n`-separated lines.
pub fn preview(text: &str) -> String {
    text.split('\n')
        .take(PREVIEW_LINES)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Submit-time check; the selected file may be missing.
pub fn require_file(selected: Option<&CsvFile>) -> Result<&CsvFile, UploadError> {
    selected.ok_or(UploadError::NoFile)
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Move on to the report page with this state.
    Uploaded(NavigationState),
    /// Send the user to log in with this state.
    SessionExpired(NavigationState),
    /// Stay and show the message.
    Failed(String),
    /// The page went away; do nothing.
    Cancelled,
}

impl UploadOutcome {
    pub fn from_result(result: Result<UploadResponse, ApiError>) -> Self {
        match result {
            Ok(resp) => {
                let mut state = NavigationState::default().with_message(UPLOAD_SUCCESS_MESSAGE);
                state.analytics = resp.analytics();
                UploadOutcome::Uploaded(state)
            }
            Err(ApiError::Unauthorized) => UploadOutcome::SessionExpired(
                NavigationState::default()
                    .with_from(AppRoute::Upload)
                    .with_message(ApiError::Unauthorized.to_string()),
            ),
            Err(err) if err.is_cancelled() => UploadOutcome::Cancelled,
            Err(err @ (ApiError::Timeout | ApiError::Network(_))) => {
                UploadOutcome::Failed(err.to_string())
            }
            Err(err) => UploadOutcome::Failed(
                err.backend_message()
                    .unwrap_or(UPLOAD_FAILED_MESSAGE)
                    .to_string(),
            ),
        }
    }
}

/// State for bouncing a signed-out visitor off the upload page.
pub fn login_required_state() -> NavigationState {
    NavigationState::default()
        .with_from(AppRoute::Upload)
        .with_message(LOGIN_REQUIRED_MESSAGE)
}
