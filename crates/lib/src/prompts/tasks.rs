//! # Default Task Prompts
//!
//! The hardcoded prompt texts for every task that calls the Extraction Service.
//! Hints and the chat template can be overridden by the server's configuration;
//! the extraction contract cannot.

// --- Structured Extraction ---

/// The fixed instruction shared by every extraction request, whatever the source.
///
/// The target schema is never given in advance; columns are discovered from the reply.
pub const EXTRACTION_CONTRACT: &str = r#"You are a Data Extraction Engine.
Analyze the provided input and extract structured records.
Output ONLY valid JSON: a JSON array of flat objects.
Format: [{"Column1": "Value", "Column2": 10, ...}]
If dates exist, format them as YYYY-MM-DD strings.
Ensure numeric fields are numbers, not strings."#;

pub const IMAGE_EXTRACTION_HINT: &str = "Extract all tabular data visible in this image. Focus on items, quantities, prices, categories, or dates.";

pub const WEB_EXTRACTION_HINT: &str = "Analyze this website text. Extract any lists, tables, or product data into a structured JSON.";

// --- Data Analyst Chat ---

/// Placeholders: `{data_context}`, `{question}`
pub const CHAT_ANALYST_TEMPLATE: &str = r#"Data Context:
{data_context}

User Question: {question}
Answer as a Data Analyst."#;
