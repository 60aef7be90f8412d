use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use vizon::errors::PromptError;
use vizon::providers::ai::{AiProvider, ContentPart};

// --- Mock AI Provider ---

/// One recorded call: the text parts joined with newlines, and how many images were sent.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub text: String,
    pub images: usize,
}

#[derive(Clone, Debug)]
enum Programmed {
    Reply(String),
    Fail(String),
}

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<(String, Programmed)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific request.
    /// The key should be a unique substring of one of the request's text parts.
    /// Keys are tried in the order they were added.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.push((key.to_string(), Programmed::Reply(response.to_string())));
    }

    /// Pre-programs a service failure (`PromptError::AiApi`) for a specific request.
    pub fn add_failure(&self, key: &str, message: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.push((key.to_string(), Programmed::Fail(message.to_string())));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, parts: &[ContentPart]) -> Result<String, PromptError> {
        let text = parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n");
        let images = parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Image { .. }))
            .count();
        self.calls.lock().unwrap().push(RecordedCall {
            text: text.clone(),
            images,
        });

        let responses = self.responses.lock().unwrap();
        for (key, programmed) in responses.iter() {
            if text.contains(key.as_str()) {
                return match programmed {
                    Programmed::Reply(reply) => Ok(reply.clone()),
                    Programmed::Fail(message) => Err(PromptError::AiApi(message.clone())),
                };
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for request. Got: '{text}'"
        )))
    }
}
