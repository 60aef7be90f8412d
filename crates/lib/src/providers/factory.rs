//! # AI Provider Factory
//!
//! Centralizes the creation of AI provider instances so that every consumer
//! (the server, tests, tools) builds them the same way from configuration.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider, ProviderOptions},
};
use serde::Deserialize;
use tracing::info;

/// The supported provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Local,
}

/// Everything needed to instantiate a provider.
#[derive(Debug, Clone)]
pub struct ProviderSpec<'a> {
    pub kind: ProviderKind,
    pub api_url: Option<&'a str>,
    pub api_key: Option<&'a str>,
    pub model_name: &'a str,
    pub options: ProviderOptions,
}

/// Creates an AI provider instance from resolved provider settings.
///
/// - Gemini requires an API key; its URL is derived from the model name when absent.
/// - Local (OpenAI-compatible) requires a URL; the key is an optional bearer token.
pub fn create_provider(spec: ProviderSpec<'_>) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match spec.kind {
        ProviderKind::Gemini => {
            let api_key = spec
                .api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or(PromptError::MissingApiKey)?;
            let api_url = spec
                .api_url
                .map(str::to_string)
                .unwrap_or_else(|| GeminiProvider::endpoint_for_model(spec.model_name));
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(
                api_url,
                api_key.to_string(),
                spec.options,
            )?)
        }
        ProviderKind::Local => {
            let api_url = spec.api_url.ok_or_else(|| {
                PromptError::AiApi("api_url is required for the local provider".to_string())
            })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Box::new(LocalAiProvider::new(
                api_url.to_string(),
                spec.api_key.map(str::to_string),
                Some(spec.model_name.to_string()),
                spec.options,
            )?)
        }
    };
    Ok(provider)
}
