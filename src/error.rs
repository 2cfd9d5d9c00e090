use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("No file provided")]
    MissingFile,

    #[error("Missing API credential: an API key is required to use {0}")]
    MissingApiKey(&'static str),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File exceeds free-tier size limit: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Upstream request failed: {status} - {body}")]
    Transport { status: u16, body: String },

    #[error("Upstream OCR error: {0}")]
    Upstream(String),

    #[error("Failed to reach upstream OCR API: {0}")]
    Request(String),

    #[error("No text extracted from the document")]
    NoTextExtracted,

    #[error("Cannot {action} from the {from} screen")]
    InvalidTransition {
        action: &'static str,
        from: &'static str,
    },

    #[error("No OCR tool selected")]
    NoToolSelected,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Whether this error was detected locally, before any network call
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OcrError::MissingFile
                | OcrError::MissingApiKey(_)
                | OcrError::UnsupportedFormat(_)
                | OcrError::FileTooLarge { .. }
        )
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            OcrError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            OcrError::MissingApiKey(_) => (StatusCode::BAD_REQUEST, "MISSING_API_KEY"),
            OcrError::UnsupportedFormat(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT"),
            OcrError::FileTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            OcrError::Transport { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_HTTP_ERROR"),
            OcrError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            OcrError::Request(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE"),
            OcrError::NoTextExtracted => (StatusCode::UNPROCESSABLE_ENTITY, "NO_TEXT_EXTRACTED"),
            OcrError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            OcrError::NoToolSelected => (StatusCode::CONFLICT, "NO_TOOL_SELECTED"),
            OcrError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            OcrError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
