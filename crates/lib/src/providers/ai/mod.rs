pub mod gemini;
pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Default timeout applied to every Extraction Service request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// One ordered piece of a multimodal request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
}

impl ContentPart {
    pub fn text(value: impl Into<String>) -> Self {
        ContentPart::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(t) => Some(t),
            ContentPart::Image { .. } => None,
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
        }
    }
}

/// Settings shared by all provider implementations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderOptions {
    pub generation: GenerationParams,
    pub timeout_secs: u64,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// A trait for interacting with an AI provider.
///
/// Implementations send an ordered sequence of text and image parts to a hosted
/// completion endpoint and return its raw text reply. The reply is untrusted.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
