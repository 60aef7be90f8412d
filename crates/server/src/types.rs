use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use vizon::{session::ChatMessage, SourceKind};

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- Session Payloads ---

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

// --- Ingestion Payloads ---

#[derive(Deserialize)]
pub struct IngestUrlRequest {
    pub url: String,
    #[serde(default)]
    pub hint: Option<String>,
}

/// What a successful ingestion reports back; the table itself is fetched separately.
#[derive(Serialize)]
pub struct IngestResponse {
    pub source: SourceKind,
    pub records: usize,
    pub columns: Vec<String>,
}

// --- Chat Payloads ---

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Serialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,
}
