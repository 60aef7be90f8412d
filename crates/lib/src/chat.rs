//! # Data Analyst Chat
//!
//! Answers free-form questions about the loaded table by embedding the whole
//! table as text into a single prompt.

use crate::{
    errors::PromptError,
    prompts::tasks::CHAT_ANALYST_TEMPLATE,
    providers::ai::{AiProvider, ContentPart},
    types::Table,
};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No data is loaded; ingest a file, image or website first")]
    NoData,
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error(transparent)]
    Service(#[from] PromptError),
}

/// Fills the `{data_context}` and `{question}` placeholders of `template`.
pub fn build_chat_prompt(template: &str, table: &Table, question: &str) -> String {
    template
        .replace("{data_context}", &table.to_text())
        .replace("{question}", question)
}

/// Asks one question about `table` and returns the model's answer.
///
/// `template` defaults to [`CHAT_ANALYST_TEMPLATE`] when `None`.
#[instrument(skip(provider, table, template))]
pub async fn ask(
    provider: &dyn AiProvider,
    table: Option<&Table>,
    question: &str,
    template: Option<&str>,
) -> Result<String, ChatError> {
    let table = table.filter(|t| !t.is_empty()).ok_or(ChatError::NoData)?;
    if question.trim().is_empty() {
        return Err(ChatError::EmptyQuestion);
    }

    let prompt = build_chat_prompt(
        template.unwrap_or(CHAT_ANALYST_TEMPLATE),
        table,
        question,
    );
    debug!("Chat prompt: {prompt}");

    let answer = provider.generate(&[ContentPart::Text(prompt)]).await?;
    info!("Chat answer received ({} chars)", answer.chars().count());
    Ok(answer)
}
