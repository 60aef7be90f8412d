//! # Shared Ingestion Types
//!
//! The not-yet-structured payloads produced by every source before any
//! AI-assisted structuring takes place.

use crate::errors::AcquisitionError;
use serde::Serialize;
use std::fmt;

/// The upper bound on text content sent to the Extraction Service, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Which kind of source a pipeline run started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    File,
    Image,
    Website,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::File => "file",
            SourceKind::Image => "image",
            SourceKind::Website => "website",
        };
        f.write_str(name)
    }
}

/// The declared format of an uploaded tabular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

impl TabularFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self, AcquisitionError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(TabularFormat::Csv),
            "xlsx" | "xlsm" => Ok(TabularFormat::Xlsx),
            "xls" => Ok(TabularFormat::Xls),
            "ods" => Ok(TabularFormat::Ods),
            _ => Err(AcquisitionError::UnsupportedFormat(format!(
                "'{file_name}' is not a .csv or spreadsheet file"
            ))),
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        !matches!(self, TabularFormat::Csv)
    }
}

/// An uploaded raster image, kept in its original encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// The payload obtained from a source, consumed once by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    TabularBytes {
        bytes: Vec<u8>,
        format: TabularFormat,
    },
    Image(ImageInput),
    /// Plain text. Construct with [`RawInput::text`] to enforce [`MAX_TEXT_CHARS`].
    Text(String),
}

impl RawInput {
    /// Builds a text input, truncated to the first [`MAX_TEXT_CHARS`] characters.
    pub fn text(content: impl Into<String>) -> Self {
        let mut content = content.into();
        let cut = truncate_chars(&content, MAX_TEXT_CHARS).len();
        content.truncate(cut);
        RawInput::Text(content)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawInput::TabularBytes { bytes, .. } => bytes.is_empty(),
            RawInput::Image(image) => image.data.is_empty(),
            RawInput::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
