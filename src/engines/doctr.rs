//! DocTR engine (simulated)
//!
//! DocTR needs a deep-learning runtime that is not bundled here. This engine
//! validates the upload the same way and reports the configured parameters
//! with a placeholder text instead of recognized content.

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::tool_config::{DocTrConfig, Tool, ToolConfig};
use crate::upload::{self, DocumentFormat, Upload};
use async_trait::async_trait;
use std::fmt::Write;

#[derive(Debug, Default)]
pub struct DocTrEngine;

impl DocTrEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn simulate(&self, upload: &Upload, config: &DocTrConfig) -> Result<String, OcrError> {
        upload::require_file(upload)?;
        let format = DocumentFormat::from_file_name(&upload.file_name)?;

        tracing::info!(
            "Simulating DocTR on a {} byte .{} file",
            upload.bytes.len(),
            format.extension()
        );

        let mut report = String::from("DocTR OCR Processing Result\n\n");
        let _ = writeln!(report, "Model: {}", config.model_type.as_str());
        let _ = writeln!(report, "Detection threshold: {}", config.detection_threshold.get());
        let _ = writeln!(report, "Recognition threshold: {}", config.recognition_threshold.get());
        let _ = writeln!(report, "Assume straight pages: {}", config.assume_straight_pages);
        let _ = writeln!(report, "Straighten pages: {}", config.straighten_pages);
        let _ = writeln!(
            report,
            "Preserve interword spaces: {}",
            config.preserve_interword_spaces
        );
        report.push('\n');
        report.push_str("This is sample text produced by the simulated DocTR engine.\n");
        report.push_str("A real deployment would show the text of your document here.");

        Ok(report)
    }
}

#[async_trait]
impl OcrEngine for DocTrEngine {
    fn tool(&self) -> Tool {
        Tool::DocTr
    }

    fn description(&self) -> &'static str {
        "Local document OCR (simulated); no API key needed"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    fn supported_formats(&self) -> Vec<String> {
        DocumentFormat::ALL
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect()
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["multilingual".to_string()]
    }

    async fn extract(
        &self,
        upload: &Upload,
        config: &ToolConfig,
        _api_key: &str,
    ) -> Result<String, OcrError> {
        match config {
            ToolConfig::DocTr(config) => self.simulate(upload, config),
            other => Err(OcrError::Internal(format!(
                "DocTR engine received a {} configuration",
                other.tool()
            ))),
        }
    }
}
