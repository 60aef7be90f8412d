//! The Structuring Request Builder.

use crate::{
    errors::AcquisitionError,
    ingest::RawInput,
    prompts::tasks::EXTRACTION_CONTRACT,
    providers::ai::ContentPart,
};
use tracing::warn;

/// A request ready to submit to the Extraction Service.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub contract: &'static str,
    pub hint: String,
    pub content: ContentPart,
}

impl ExtractionRequest {
    /// The ordered parts: contract, hint, content.
    pub fn into_parts(self) -> Vec<ContentPart> {
        vec![
            ContentPart::Text(self.contract.to_string()),
            ContentPart::Text(self.hint),
            self.content,
        ]
    }
}

/// Pairs image or text content with the fixed contract and a task hint.
///
/// Empty content is passed through; the service or the normalizer fails on it.
pub fn build_request(raw: RawInput, hint: &str) -> Result<ExtractionRequest, AcquisitionError> {
    if raw.is_empty() {
        warn!("Building an extraction request with empty content");
    }
    let content = match raw {
        RawInput::TabularBytes { .. } => return Err(AcquisitionError::NotUnstructured),
        RawInput::Image(image) => ContentPart::Image {
            mime_type: image.mime_type,
            data: image.data,
        },
        RawInput::Text(text) => ContentPart::Text(text),
    };
    Ok(ExtractionRequest {
        contract: EXTRACTION_CONTRACT,
        hint: hint.to_string(),
        content,
    })
}
