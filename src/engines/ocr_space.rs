//! OCR.Space engine
//!
//! Validates the upload locally, posts it to the OCR.Space parse endpoint
//! and normalizes the JSON reply into plain text.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::tool_config::{Language, OcrSpaceConfig, Tool, ToolConfig};
use crate::transport::{UploadForm, UpstreamReply, UpstreamTransport};
use crate::upload::{self, DocumentFormat, Upload, FREE_TIER_MAX_BYTES};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Subset of the OCR.Space parse response this engine reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParseResponse {
    #[serde(default)]
    is_errored_on_processing: bool,
    /// A string or an array of strings, depending on the failure
    #[serde(default)]
    error_message: Option<Value>,
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

pub struct OcrSpaceEngine {
    transport: Arc<dyn UpstreamTransport>,
    endpoint: String,
}

impl OcrSpaceEngine {
    pub fn new(transport: Arc<dyn UpstreamTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Run one extraction against the upstream API
    pub async fn extract_text(
        &self,
        upload: &Upload,
        config: &OcrSpaceConfig,
        api_key: &str,
    ) -> Result<String, OcrError> {
        let format = validate(upload, api_key)?;

        let mut fields = vec![("apikey", api_key.to_string())];
        fields.extend(config.form_fields());

        let form = UploadForm {
            file_name: format!("document.{}", format.extension()),
            mime_type: format.mime_type(),
            file_bytes: upload.bytes.clone(),
            fields,
        };

        tracing::info!(
            "Sending {} bytes to OCR.Space (language: {}, engine: {})",
            upload.bytes.len(),
            config.language.code(),
            config.ocr_engine.get()
        );

        let reply = self.transport.post_form(&self.endpoint, form).await?;
        normalize(reply)
    }
}

/// Local checks, first failure wins. None of these touch the network.
fn validate(upload: &Upload, api_key: &str) -> Result<DocumentFormat, OcrError> {
    upload::require_file(upload)?;
    if api_key.trim().is_empty() {
        return Err(OcrError::MissingApiKey(Tool::OcrSpace.display_name()));
    }
    let format = DocumentFormat::from_file_name(&upload.file_name)?;
    upload::check_size(upload, FREE_TIER_MAX_BYTES)?;
    Ok(format)
}

fn normalize(reply: UpstreamReply) -> Result<String, OcrError> {
    if !reply.is_success() {
        tracing::warn!("OCR.Space returned HTTP {}", reply.status);
        return Err(OcrError::Transport {
            status: reply.status,
            body: reply.body,
        });
    }

    let parsed: ParseResponse = serde_json::from_str(&reply.body).map_err(|e| {
        OcrError::Request(format!("Unexpected response from OCR.Space: {}", e))
    })?;

    if parsed.is_errored_on_processing {
        let message = parsed
            .error_message
            .as_ref()
            .map(error_text)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        tracing::warn!("OCR.Space reported a processing error: {}", message);
        return Err(OcrError::Upstream(message));
    }

    let text = parsed
        .parsed_results
        .unwrap_or_default()
        .into_iter()
        .map(|result| result.parsed_text.unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(OcrError::NoTextExtracted);
    }

    Ok(text)
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl OcrEngine for OcrSpaceEngine {
    fn tool(&self) -> Tool {
        Tool::OcrSpace
    }

    fn description(&self) -> &'static str {
        "Hosted OCR API; requires an API key, free tier limited to 1 MB per file"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    fn supported_formats(&self) -> Vec<String> {
        DocumentFormat::ALL
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect()
    }

    fn supported_languages(&self) -> Vec<String> {
        Language::ALL.iter().map(|l| l.code().to_string()).collect()
    }

    async fn extract(
        &self,
        upload: &Upload,
        config: &ToolConfig,
        api_key: &str,
    ) -> Result<String, OcrError> {
        match config {
            ToolConfig::OcrSpace(config) => self.extract_text(upload, config, api_key).await,
            other => Err(OcrError::Internal(format!(
                "OCR.Space engine received a {} configuration",
                other.tool()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::MockTransport;
    use serde_json::json;

    fn engine_with(transport: Arc<MockTransport>) -> OcrSpaceEngine {
        OcrSpaceEngine::new(transport, "http://upstream.test/parse/image")
    }

    fn png(bytes: usize) -> Upload {
        Upload::new(vec![0x89u8; bytes], "scan.png")
    }

    fn extract(engine: &OcrSpaceEngine, upload: &Upload, api_key: &str) -> Result<String, OcrError> {
        tokio_test::block_on(engine.extract_text(upload, &OcrSpaceConfig::default(), api_key))
    }

    #[test]
    fn test_joins_parsed_results_with_newlines() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": false,
            "ParsedResults": [{ "ParsedText": "Hello" }, { "ParsedText": "World" }]
        })));
        let engine = engine_with(transport.clone());

        assert_eq!(extract(&engine, &png(16), "key").unwrap(), "Hello\nWorld");
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_empty_results_is_no_text() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": false,
            "ParsedResults": []
        })));
        let engine = engine_with(transport);

        let err = extract(&engine, &png(16), "key").unwrap_err();
        assert!(matches!(err, OcrError::NoTextExtracted));
        assert!(err.to_string().contains("No text extracted"));
    }

    #[test]
    fn test_whitespace_only_text_is_no_text() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": false,
            "ParsedResults": [{ "ParsedText": "  " }, { "ParsedText": "\r\n" }]
        })));
        let engine = engine_with(transport);

        assert!(matches!(
            extract(&engine, &png(16), "key"),
            Err(OcrError::NoTextExtracted)
        ));
    }

    #[test]
    fn test_missing_parsed_results_is_no_text() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": false,
            "ParsedResults": null
        })));
        let engine = engine_with(transport);

        assert!(matches!(
            extract(&engine, &png(16), "key"),
            Err(OcrError::NoTextExtracted)
        ));
    }

    #[test]
    fn test_processing_error_surfaces_message() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": true,
            "ErrorMessage": "Bad image"
        })));
        let engine = engine_with(transport);

        let err = extract(&engine, &png(16), "key").unwrap_err();
        assert!(matches!(err, OcrError::Upstream(_)));
        assert!(err.to_string().contains("Bad image"));
    }

    #[test]
    fn test_processing_error_with_message_array() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["File failed validation", "Timed out"]
        })));
        let engine = engine_with(transport);

        let msg = extract(&engine, &png(16), "key").unwrap_err().to_string();
        assert!(msg.contains("File failed validation; Timed out"));
    }

    #[test]
    fn test_http_error_includes_status_and_body() {
        let transport = Arc::new(MockTransport::replying(500, "Server error"));
        let engine = engine_with(transport);

        let msg = extract(&engine, &png(16), "key").unwrap_err().to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Server error"));
    }

    #[test]
    fn test_unparseable_body_is_request_error() {
        let transport = Arc::new(MockTransport::replying(200, "<html>maintenance</html>"));
        let engine = engine_with(transport);

        assert!(matches!(
            extract(&engine, &png(16), "key"),
            Err(OcrError::Request(_))
        ));
    }

    #[test]
    fn test_missing_api_key_never_calls_upstream() {
        let transport = Arc::new(MockTransport::ok_json(json!({})));
        let engine = engine_with(transport.clone());

        for key in ["", "   "] {
            let err = extract(&engine, &png(16), key).unwrap_err();
            assert!(matches!(err, OcrError::MissingApiKey(_)));
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_validation_order() {
        let transport = Arc::new(MockTransport::ok_json(json!({})));
        let engine = engine_with(transport.clone());

        // Empty file wins over a missing key
        let empty = Upload::new(Vec::new(), "scan.gif");
        assert!(matches!(
            extract(&engine, &empty, ""),
            Err(OcrError::MissingFile)
        ));

        // Missing key wins over a bad extension
        let gif = Upload::new(vec![1u8; 10], "anim.gif");
        assert!(matches!(
            extract(&engine, &gif, ""),
            Err(OcrError::MissingApiKey(_))
        ));

        // Bad extension wins over size
        let big_gif = Upload::new(vec![1u8; FREE_TIER_MAX_BYTES + 1], "anim.gif");
        assert!(matches!(
            extract(&engine, &big_gif, "key"),
            Err(OcrError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            extract(&engine, &png(FREE_TIER_MAX_BYTES + 1), "key"),
            Err(OcrError::FileTooLarge { .. })
        ));

        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_form_carries_key_config_and_named_file() {
        let transport = Arc::new(MockTransport::ok_json(json!({
            "IsErroredOnProcessing": false,
            "ParsedResults": [{ "ParsedText": "ok" }]
        })));
        let engine = engine_with(transport.clone());
        let upload = Upload::new(vec![7u8; 32], "Invoice.JPEG");

        extract(&engine, &upload, "key-123").unwrap();

        let form = transport.last_form().unwrap();
        assert_eq!(form.file_name, "document.jpeg");
        assert_eq!(form.mime_type, "image/jpeg");
        assert_eq!(form.file_bytes.len(), 32);

        let names: Vec<&str> = form.fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "apikey",
                "language",
                "isOverlayRequired",
                "detectOrientation",
                "scale",
                "OCREngine"
            ]
        );
        assert_eq!(form.fields[0].1, "key-123");
    }

    #[test]
    fn test_rejects_foreign_config() {
        let transport = Arc::new(MockTransport::ok_json(json!({})));
        let engine = engine_with(transport.clone());

        let result = tokio_test::block_on(engine.extract(
            &png(16),
            &Tool::DocTr.default_config(),
            "key",
        ));
        assert!(matches!(result, Err(OcrError::Internal(_))));
        assert_eq!(transport.call_count(), 0);
    }
}
