//! OCR engine implementations
//!
//! One engine per selectable tool. The registry resolves the engine for the
//! tool a session has selected.

pub mod doctr;
pub mod ocr_space;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::tool_config::Tool;
use crate::transport::{HttpTransport, UpstreamTransport};
use serde::Serialize;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub tool: Tool,
    pub name: &'static str,
    pub description: &'static str,
    pub requires_api_key: bool,
    pub supported_formats: Vec<String>,
    pub supported_languages: Vec<String>,
}

/// Registry of available OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
}

impl EngineRegistry {
    /// Create a registry that reaches OCR.Space over HTTP
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a registry on top of an arbitrary upstream transport
    pub fn with_transport(config: &Config, transport: Arc<dyn UpstreamTransport>) -> Self {
        tracing::info!("OCR.Space endpoint: {}", config.ocr_space_endpoint);

        let engines: Vec<Arc<dyn OcrEngine>> = vec![
            Arc::new(ocr_space::OcrSpaceEngine::new(
                transport,
                config.ocr_space_endpoint.clone(),
            )),
            Arc::new(doctr::DocTrEngine::new()),
        ];

        Self { engines }
    }

    /// Get the engine for a tool
    pub fn get(&self, tool: Tool) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.tool() == tool).cloned()
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                tool: e.tool(),
                name: e.tool().display_name(),
                description: e.description(),
                requires_api_key: e.requires_api_key(),
                supported_formats: e.supported_formats(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::MockTransport;

    #[test]
    fn test_every_tool_has_an_engine() {
        let config = Config::for_tests();
        let registry =
            EngineRegistry::with_transport(&config, Arc::new(MockTransport::replying(200, "{}")));

        for tool in Tool::ALL {
            assert_eq!(registry.get(tool).map(|e| e.tool()), Some(tool));
        }
    }

    #[test]
    fn test_info_marks_credentialed_tools() {
        let config = Config::for_tests();
        let registry =
            EngineRegistry::with_transport(&config, Arc::new(MockTransport::replying(200, "{}")));

        let info = registry.info();
        let ocr_space = info.iter().find(|i| i.tool == Tool::OcrSpace).unwrap();
        let doctr = info.iter().find(|i| i.tool == Tool::DocTr).unwrap();

        assert!(ocr_space.requires_api_key);
        assert!(!doctr.requires_api_key);
        assert!(ocr_space.supported_formats.contains(&".pdf".to_string()));
        assert!(ocr_space.supported_languages.contains(&"chi_tra".to_string()));
    }
}
