use thiserror::Error;

/// Errors raised while talking to the Extraction Service.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("AI provider did not respond within {0} seconds")]
    Timeout(u64),
    #[error("AI provider rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("AI provider rate limit or quota exceeded: {0}")]
    RateLimited(String),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("API key is missing")]
    MissingApiKey,
}

impl PromptError {
    /// Maps a failed `send()` into a timeout or a generic request error.
    /// The request URL is dropped so it never reaches a response body.
    pub(crate) fn from_send(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            PromptError::Timeout(timeout_secs)
        } else {
            PromptError::AiRequest(err.without_url())
        }
    }

    /// Maps a non-success HTTP status from a provider into the matching variant.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => PromptError::Unauthorized(body),
            429 => PromptError::RateLimited(body),
            _ => PromptError::AiApi(format!("status {status}: {body}")),
        }
    }
}

/// Errors raised while obtaining a `RawInput` from a source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquisitionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to parse tabular data: {0}")]
    Parse(String),
    #[error("Image could not be decoded: {0}")]
    UndecodableImage(String),
    #[error("Tabular input does not need AI-assisted structuring")]
    NotUnstructured,
}

/// Errors raised while turning a model reply into a `Table`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("The model returned an empty reply")]
    EmptyReply,
    #[error("parse error: {0}")]
    InvalidJson(String),
    #[error("Expected a JSON array of records, found {0}")]
    NotAnArray(&'static str),
    #[error("Record {index} is not a JSON object")]
    RecordNotObject { index: usize },
    #[error("Record {record} has a nested value in column '{column}'")]
    NestedValue { record: usize, column: String },
}

/// The outcome of a failed pipeline run, one variant per stage.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Service(#[from] PromptError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl ExtractionError {
    /// A short, stable label for the failing stage.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Acquisition(_) => "acquisition",
            ExtractionError::Service(_) => "service",
            ExtractionError::Normalization(_) => "normalization",
        }
    }
}
