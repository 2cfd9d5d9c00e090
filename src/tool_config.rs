//! Per-tool configuration
//!
//! Each tool owns a strongly-typed option set. Field ranges are enforced by
//! the types themselves, so a config that deserializes is always sendable.

use crate::error::OcrError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// OCR backends a session can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Hosted OCR.Space API
    OcrSpace,
    /// Local DocTR pipeline (simulated)
    DocTr,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::OcrSpace, Tool::DocTr];

    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::OcrSpace => "OCR.Space",
            Tool::DocTr => "DocTR",
        }
    }

    /// The fixed default configuration seeded on selection
    pub fn default_config(&self) -> ToolConfig {
        match self {
            Tool::OcrSpace => ToolConfig::OcrSpace(OcrSpaceConfig::default()),
            Tool::DocTr => ToolConfig::DocTr(DocTrConfig::default()),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Configuration attached to the selected tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolConfig {
    OcrSpace(OcrSpaceConfig),
    DocTr(DocTrConfig),
}

impl ToolConfig {
    pub fn tool(&self) -> Tool {
        match self {
            ToolConfig::OcrSpace(_) => Tool::OcrSpace,
            ToolConfig::DocTr(_) => Tool::DocTr,
        }
    }

    /// Merge a partial set of fields into this config.
    ///
    /// The merged record is re-validated as a whole; on any error `self`
    /// is left untouched.
    pub fn apply_patch(&mut self, patch: Map<String, Value>) -> Result<(), OcrError> {
        match self {
            ToolConfig::OcrSpace(config) => *config = merged(config, patch)?,
            ToolConfig::DocTr(config) => *config = merged(config, patch)?,
        }
        Ok(())
    }
}

fn merged<T>(current: &T, patch: Map<String, Value>) -> Result<T, OcrError>
where
    T: Serialize + DeserializeOwned,
{
    let mut fields = match serde_json::to_value(current) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => return Err(OcrError::Internal("config is not an object".to_string())),
        Err(e) => return Err(OcrError::Internal(format!("Failed to encode config: {}", e))),
    };
    fields.extend(patch);

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| OcrError::InvalidRequest(format!("Invalid configuration: {}", e)))
}

// ============================================================================
// OCR.Space
// ============================================================================

/// Recognition languages offered by OCR.Space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Por,
    Eng,
    Spa,
    Fra,
    Deu,
    Ita,
    Jpn,
    Kor,
    ChiSim,
    ChiTra,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::Por,
        Language::Eng,
        Language::Spa,
        Language::Fra,
        Language::Deu,
        Language::Ita,
        Language::Jpn,
        Language::Kor,
        Language::ChiSim,
        Language::ChiTra,
    ];

    /// Language code as sent upstream
    pub fn code(&self) -> &'static str {
        match self {
            Language::Por => "por",
            Language::Eng => "eng",
            Language::Spa => "spa",
            Language::Fra => "fra",
            Language::Deu => "deu",
            Language::Ita => "ita",
            Language::Jpn => "jpn",
            Language::Kor => "kor",
            Language::ChiSim => "chi_sim",
            Language::ChiTra => "chi_tra",
        }
    }
}

/// OCR.Space engine number, 1 (fastest) to 3 (multi-language)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EngineVersion(u8);

impl EngineVersion {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for EngineVersion {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for EngineVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "OCR engine must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ))
        }
    }
}

impl From<EngineVersion> for u8 {
    fn from(version: EngineVersion) -> Self {
        version.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcrSpaceConfig {
    pub language: Language,
    #[serde(rename = "isOverlayRequired")]
    pub is_overlay_required: bool,
    #[serde(rename = "detectOrientation")]
    pub detect_orientation: bool,
    pub scale: bool,
    #[serde(rename = "OCREngine")]
    pub ocr_engine: EngineVersion,
}

impl Default for OcrSpaceConfig {
    fn default() -> Self {
        Self {
            language: Language::Por,
            is_overlay_required: true,
            detect_orientation: true,
            scale: true,
            ocr_engine: EngineVersion::default(),
        }
    }
}

impl OcrSpaceConfig {
    /// Form fields sent upstream, one per config field
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("language", self.language.code().to_string()),
            ("isOverlayRequired", self.is_overlay_required.to_string()),
            ("detectOrientation", self.detect_orientation.to_string()),
            ("scale", self.scale.to_string()),
            ("OCREngine", self.ocr_engine.get().to_string()),
        ]
    }
}

// ============================================================================
// DocTR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Resnet50,
    MobilenetV3Small,
    MobilenetV3Large,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Resnet50 => "resnet50",
            ModelType::MobilenetV3Small => "mobilenet_v3_small",
            ModelType::MobilenetV3Large => "mobilenet_v3_large",
        }
    }
}

/// Confidence threshold in 0.1..=0.9
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Threshold(f32);

impl Threshold {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 0.9;

    pub fn get(&self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Threshold {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        // Tolerate float noise at the edges (0.1 does not round-trip exactly)
        if value >= Self::MIN - f32::EPSILON && value <= Self::MAX + f32::EPSILON {
            Ok(Self(value))
        } else {
            Err(format!(
                "threshold must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ))
        }
    }
}

impl From<Threshold> for f32 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocTrConfig {
    pub model_type: ModelType,
    pub detection_threshold: Threshold,
    pub recognition_threshold: Threshold,
    pub assume_straight_pages: bool,
    pub straighten_pages: bool,
    pub preserve_interword_spaces: bool,
}

impl Default for DocTrConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::Resnet50,
            detection_threshold: Threshold(0.5),
            recognition_threshold: Threshold(0.3),
            assume_straight_pages: true,
            straighten_pages: true,
            preserve_interword_spaces: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[test]
    fn test_ocr_space_defaults() {
        let config = OcrSpaceConfig::default();
        assert_eq!(config.language, Language::Por);
        assert!(config.is_overlay_required);
        assert!(config.detect_orientation);
        assert!(config.scale);
        assert_eq!(config.ocr_engine.get(), 2);
    }

    #[test]
    fn test_ocr_space_serializes_exactly_five_fields() {
        let value = serde_json::to_value(OcrSpaceConfig::default()).unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 5);
        for key in [
            "language",
            "isOverlayRequired",
            "detectOrientation",
            "scale",
            "OCREngine",
        ] {
            assert!(fields.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn test_form_fields_map_one_to_one() {
        let fields = OcrSpaceConfig::default().form_fields();
        assert_eq!(
            fields,
            vec![
                ("language", "por".to_string()),
                ("isOverlayRequired", "true".to_string()),
                ("detectOrientation", "true".to_string()),
                ("scale", "true".to_string()),
                ("OCREngine", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_patch_updates_fields() {
        let mut config = Tool::OcrSpace.default_config();
        config
            .apply_patch(patch(json!({ "language": "chi_sim", "OCREngine": 3, "scale": false })))
            .unwrap();

        match config {
            ToolConfig::OcrSpace(c) => {
                assert_eq!(c.language, Language::ChiSim);
                assert_eq!(c.ocr_engine.get(), 3);
                assert!(!c.scale);
                assert!(c.detect_orientation);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_patch_rejects_out_of_range_engine() {
        let mut config = Tool::OcrSpace.default_config();
        let before = config.clone();
        let err = config
            .apply_patch(patch(json!({ "language": "eng", "OCREngine": 4 })))
            .unwrap_err();
        assert!(matches!(err, OcrError::InvalidRequest(_)));
        assert_eq!(config, before);
    }

    #[test]
    fn test_patch_rejects_unknown_language_and_field() {
        let mut config = Tool::OcrSpace.default_config();
        assert!(config
            .apply_patch(patch(json!({ "language": "klingon" })))
            .is_err());
        assert!(config
            .apply_patch(patch(json!({ "filetype": "auto" })))
            .is_err());
        assert_eq!(config, Tool::OcrSpace.default_config());
    }

    #[test]
    fn test_doctr_threshold_bounds() {
        let mut config = Tool::DocTr.default_config();
        config
            .apply_patch(patch(json!({ "detection_threshold": 0.9, "model_type": "mobilenet_v3_large" })))
            .unwrap();
        assert!(config
            .apply_patch(patch(json!({ "recognition_threshold": 0.95 })))
            .is_err());
        assert!(config
            .apply_patch(patch(json!({ "recognition_threshold": 0.05 })))
            .is_err());

        match config {
            ToolConfig::DocTr(c) => {
                assert_eq!(c.model_type, ModelType::MobilenetV3Large);
                assert!((c.detection_threshold.get() - 0.9).abs() < 1e-6);
                assert!((c.recognition_threshold.get() - 0.3).abs() < 1e-6);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_tool_config_is_tagged() {
        let value = serde_json::to_value(Tool::DocTr.default_config()).unwrap();
        assert_eq!(value["tool"], "doc_tr");
        assert_eq!(value["model_type"], "resnet50");
    }

    #[test]
    fn test_language_codes_match_serde_names() {
        for language in Language::ALL {
            let value = serde_json::to_value(language).unwrap();
            assert_eq!(value, language.code());
        }
    }
}
