use crate::{
    errors::PromptError,
    providers::ai::{AiProvider, ContentPart, ProviderOptions},
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct LocalAiRequest<'a> {
    messages: Vec<LocalAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct LocalAiMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Plain(String),
    Parts(Vec<MessagePart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessagePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize, Debug)]
struct LocalAiResponse {
    #[serde(default)]
    choices: Vec<LocalAiChoice>,
}

#[derive(Deserialize, Debug)]
struct LocalAiChoice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text-only requests go out as a plain string, for servers without multi-part support.
fn message_content(parts: &[ContentPart]) -> MessageContent {
    let texts: Option<Vec<&str>> = parts.iter().map(ContentPart::as_text).collect();
    if let Some(texts) = texts {
        return MessageContent::Plain(texts.join("\n\n"));
    }
    MessageContent::Parts(
        parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => MessagePart::Text { text: text.clone() },
                ContentPart::Image { mime_type, data } => MessagePart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!(
                            "data:{mime_type};base64,{}",
                            general_purpose::STANDARD.encode(data)
                        ),
                    },
                },
            })
            .collect(),
    )
}

// --- Local Provider implementation ---

/// A provider for interacting with a local or OpenAI-compatible API.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
    options: ProviderOptions,
}

impl LocalAiProvider {
    /// Creates a new `LocalAiProvider`.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
        options: ProviderOptions,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            options,
        })
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String, PromptError> {
        let request_body = LocalAiRequest {
            messages: vec![LocalAiMessage {
                role: "user",
                content: message_content(parts),
            }],
            model: self.model.as_deref(),
            temperature: self.options.generation.temperature,
            top_p: self.options.generation.top_p,
            max_tokens: self.options.generation.max_output_tokens,
            stream: false,
        };

        let mut request_builder = self.client.post(&self.api_url);

        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        debug!(parts = parts.len(), "--> Sending request to local AI provider");

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(|e| PromptError::from_send(e, self.options.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::from_status(status, error_text));
        }

        let local_ai_response: LocalAiResponse = response
            .json()
            .await
            .map_err(|e| PromptError::AiDeserialization(e.without_url()))?;

        let raw_response = local_ai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(raw_response)
    }
}
