//! # AI-Assisted Structuring
//!
//! Turns an unstructured `RawInput` into a `Table` by asking the Extraction
//! Service for a JSON array of flat records and validating its reply.

pub mod normalize;
pub mod request;

pub use normalize::{normalize_response, strip_code_fences, NestedValuePolicy};
pub use request::{build_request, ExtractionRequest};

use crate::{errors::ExtractionError, ingest::RawInput, providers::ai::AiProvider, types::Table};
use tracing::{debug, info, instrument};

/// A table produced by the Extraction Service, with the reply it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub table: Table,
    pub raw_reply: String,
}

/// Runs one structuring request end to end.
///
/// No retry is attempted: a failed service call or an invalid reply is returned
/// as is.
#[instrument(skip(provider, raw, hint))]
pub async fn extract_structured(
    provider: &dyn AiProvider,
    raw: RawInput,
    hint: &str,
    policy: NestedValuePolicy,
) -> Result<Extraction, ExtractionError> {
    let request = build_request(raw, hint)?;
    debug!("Extraction hint: {}", request.hint);

    let raw_reply = provider.generate(&request.into_parts()).await?;
    debug!("Extraction reply: {raw_reply}");

    let table = normalize_response(&raw_reply, policy)?;
    info!(
        "Extracted {} records across {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(Extraction { table, raw_reply })
}
