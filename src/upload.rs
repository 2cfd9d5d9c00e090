//! Upload validation
//!
//! Gating is extension-based only; file contents are never sniffed.

use crate::error::OcrError;
use std::path::Path;

/// Upstream free-tier limit, checked locally to avoid a wasted round trip
pub const FREE_TIER_MAX_BYTES: usize = 1_000_000;

/// A file handed over by the upload surface
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl Upload {
    pub fn new(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
        }
    }
}

/// Document formats accepted for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Jpg,
    Jpeg,
    Png,
    Pdf,
    Tiff,
    Bmp,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 6] = [
        Self::Jpg,
        Self::Jpeg,
        Self::Png,
        Self::Pdf,
        Self::Tiff,
        Self::Bmp,
    ];

    /// Detect the format from a file name, case-insensitively
    pub fn from_file_name(file_name: &str) -> Result<Self, OcrError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" => Ok(Self::Jpg),
            "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "tiff" => Ok(Self::Tiff),
            "bmp" => Ok(Self::Bmp),
            "" => Err(OcrError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                file_name
            ))),
            other => Err(OcrError::UnsupportedFormat(format!(".{}", other))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Pdf => "pdf",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
            Self::Tiff => "image/tiff",
            Self::Bmp => "image/bmp",
        }
    }
}

/// Fails with `MissingFile` for an empty upload
pub fn require_file(upload: &Upload) -> Result<(), OcrError> {
    if upload.bytes.is_empty() {
        return Err(OcrError::MissingFile);
    }
    Ok(())
}

/// Fails with `FileTooLarge` above `max` bytes
pub fn check_size(upload: &Upload, max: usize) -> Result<(), OcrError> {
    let size = upload.bytes.len();
    if size > max {
        return Err(OcrError::FileTooLarge { size, max });
    }
    Ok(())
}
