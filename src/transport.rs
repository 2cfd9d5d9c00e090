//! Upstream HTTP transport
//!
//! The OCR.Space adapter talks to the network only through `UpstreamTransport`,
//! which keeps the request/response translation testable without a server.

use crate::error::OcrError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

/// One multipart upload, described independently of the HTTP client
#[derive(Debug, Clone)]
pub struct UploadForm {
    pub file_name: String,
    pub mime_type: &'static str,
    pub file_bytes: Vec<u8>,
    pub fields: Vec<(&'static str, String)>,
}

/// Status and raw body of an upstream response
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send a single multipart POST and return whatever came back
    async fn post_form(&self, endpoint: &str, form: UploadForm) -> Result<UpstreamReply, OcrError>;
}

/// reqwest-backed transport with default client timeouts and no retries
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn post_form(&self, endpoint: &str, form: UploadForm) -> Result<UpstreamReply, OcrError> {
        let part = Part::bytes(form.file_bytes)
            .file_name(form.file_name)
            .mime_str(form.mime_type)
            .map_err(|e| OcrError::Internal(format!("Invalid MIME type: {}", e)))?;

        let multipart = form
            .fields
            .into_iter()
            .fold(Form::new().part("file", part), |acc, (name, value)| {
                acc.text(name, value)
            });

        let response = self
            .client
            .post(endpoint)
            .multipart(multipart)
            .send()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Request(format!("Failed to read response body: {}", e)))?;

        Ok(UpstreamReply { status, body })
    }
}
