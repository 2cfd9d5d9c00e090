use crate::error::OcrError;
use crate::tool_config::{Tool, ToolConfig};
use crate::upload::Upload;
use async_trait::async_trait;

/// Trait that all OCR tools must implement
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Returns the tool this engine serves
    fn tool(&self) -> Tool;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Whether `extract` needs a non-empty API key
    fn requires_api_key(&self) -> bool;

    /// Get supported file extensions
    fn supported_formats(&self) -> Vec<String>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;

    /// Extract text from one uploaded file.
    ///
    /// Runs to completion; there is no partial result and no retry.
    async fn extract(
        &self,
        upload: &Upload,
        config: &ToolConfig,
        api_key: &str,
    ) -> Result<String, OcrError>;
}
