//! Navigation state machine
//!
//! `Session` is owned by its caller and mutated only through the transition
//! methods below. A rejected transition never changes any field.

use crate::error::OcrError;
use crate::tool_config::{Tool, ToolConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    Config,
    Extraction,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Config => "config",
            Screen::Extraction => "extraction",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    screen: Screen,
    selected_tool: Option<Tool>,
    config: Option<ToolConfig>,
    api_key: String,
    last_result: String,
}

/// Serializable view of a session. The API key is reduced to a flag.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub screen: Screen,
    pub selected_tool: Option<Tool>,
    pub config: Option<ToolConfig>,
    pub has_api_key: bool,
    pub last_result: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn selected_tool(&self) -> Option<Tool> {
        self.selected_tool
    }

    pub fn config(&self) -> Option<&ToolConfig> {
        self.config.as_ref()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn last_result(&self) -> &str {
        &self.last_result
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            screen: self.screen,
            selected_tool: self.selected_tool,
            config: self.config.clone(),
            has_api_key: !self.api_key.is_empty(),
            last_result: self.last_result.clone(),
        }
    }

    /// Home -> Config, seeding the tool's default configuration
    pub fn select_tool(&mut self, tool: Tool) -> Result<(), OcrError> {
        self.expect_screen(Screen::Home, "select a tool")?;

        self.selected_tool = Some(tool);
        self.config = Some(tool.default_config());
        self.last_result.clear();
        self.screen = Screen::Config;

        tracing::info!("Selected tool {}", tool);
        Ok(())
    }

    /// Config -> Extraction. Config values are not re-validated here.
    pub fn proceed_to_extraction(&mut self) -> Result<(), OcrError> {
        self.expect_screen(Screen::Config, "proceed to extraction")?;
        self.screen = Screen::Extraction;
        tracing::debug!("Navigated to extraction");
        Ok(())
    }

    /// Extraction -> Config
    pub fn back_to_config(&mut self) -> Result<(), OcrError> {
        self.expect_screen(Screen::Extraction, "go back to configuration")?;
        self.screen = Screen::Config;
        tracing::debug!("Navigated back to configuration");
        Ok(())
    }

    /// Any screen -> Config, provided a tool has been selected
    pub fn go_to_config(&mut self) -> Result<(), OcrError> {
        if self.selected_tool.is_none() || self.config.is_none() {
            tracing::warn!("Rejected navigation to configuration without a tool");
            return Err(OcrError::NoToolSelected);
        }
        self.screen = Screen::Config;
        tracing::debug!("Navigated to configuration");
        Ok(())
    }

    /// Any screen -> Home. This is the only reset path; the API key survives it.
    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
        self.selected_tool = None;
        self.config = None;
        self.last_result.clear();
        tracing::debug!("Navigated home, session reset");
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into().trim().to_string();
    }

    /// Edit the current tool's configuration in place (Config screen only)
    pub fn update_config(&mut self, patch: Map<String, Value>) -> Result<(), OcrError> {
        self.expect_screen(Screen::Config, "edit the configuration")?;
        let config = self.config.as_mut().ok_or(OcrError::NoToolSelected)?;
        config.apply_patch(patch)
    }

    /// Check that an extraction may run and hand back what it needs
    pub fn extraction_context(&self) -> Result<(ToolConfig, String), OcrError> {
        self.expect_screen(Screen::Extraction, "extract text")?;
        let config = self.config.clone().ok_or(OcrError::NoToolSelected)?;
        Ok((config, self.api_key.clone()))
    }

    /// Store the outcome of one extraction as display text
    pub fn record_result(&mut self, outcome: &Result<String, OcrError>) {
        self.last_result = match outcome {
            Ok(text) => text.clone(),
            Err(e) => e.to_string(),
        };
    }

    fn expect_screen(&self, expected: Screen, action: &'static str) -> Result<(), OcrError> {
        if self.screen != expected {
            tracing::warn!(
                "Rejected transition: cannot {} from {}",
                action,
                self.screen.as_str()
            );
            return Err(OcrError::InvalidTransition {
                action,
                from: self.screen.as_str(),
            });
        }
        Ok(())
    }
}
