//! # Ingestion Pipeline
//!
//! One entry point per source. Each acquires a `RawInput`, structures it into a
//! `Table` and returns the outcome; storing it in a session is the caller's job.

use crate::state::AppState;
use tracing::{info, instrument};
use vizon::{
    extract_structured, ingest::load_image, AcquisitionError, ExtractionError, RawInput,
    SourceKind, Table,
};

/// A successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub source: SourceKind,
    pub table: Table,
    /// The Extraction Service reply, absent for tabular files.
    pub raw_reply: Option<String>,
}

/// Parses an uploaded CSV or spreadsheet. The Extraction Service is not involved.
/// Parsing runs on the blocking pool.
#[instrument(skip(bytes), fields(size = bytes.len()))]
pub async fn run_file(bytes: Vec<u8>, file_name: &str) -> Result<PipelineOutcome, ExtractionError> {
    let raw = vizon_sheets::acquire_file(file_name, bytes)?;
    let table = tokio::task::spawn_blocking(move || vizon_sheets::table_from_raw(&raw))
        .await
        .map_err(|e| AcquisitionError::Parse(format!("parsing task failed: {e}")))??;
    info!("File '{file_name}' gave {} records", table.len());
    Ok(PipelineOutcome {
        source: SourceKind::File,
        table,
        raw_reply: None,
    })
}

/// Structures an uploaded image. `hint` falls back to the configured image hint.
/// The image is decoded on the blocking pool.
#[instrument(skip(state, bytes), fields(size = bytes.len()))]
pub async fn run_image(
    state: &AppState,
    bytes: Vec<u8>,
    hint: Option<&str>,
) -> Result<PipelineOutcome, ExtractionError> {
    let raw = tokio::task::spawn_blocking(move || load_image(bytes))
        .await
        .map_err(|e| AcquisitionError::UndecodableImage(format!("decoding task failed: {e}")))??;
    let hint = hint.unwrap_or(&state.config.extraction.image_hint);
    structure(state, raw, hint, SourceKind::Image).await
}

/// Fetches a page and structures its visible text. Fetch failures become the
/// page text and are structured like any other content.
#[instrument(skip(state))]
pub async fn run_url(
    state: &AppState,
    url: &str,
    hint: Option<&str>,
) -> Result<PipelineOutcome, ExtractionError> {
    let raw = state.web_fetcher.fetch_page_text(url).await;
    let hint = hint.unwrap_or(&state.config.extraction.web_hint);
    structure(state, raw, hint, SourceKind::Website).await
}

async fn structure(
    state: &AppState,
    raw: RawInput,
    hint: &str,
    source: SourceKind,
) -> Result<PipelineOutcome, ExtractionError> {
    let extraction = extract_structured(
        state.ai_provider.as_ref(),
        raw,
        hint,
        state.config.extraction.nested_values,
    )
    .await?;
    info!("{source} extraction gave {} records", extraction.table.len());
    Ok(PipelineOutcome {
        source,
        table: extraction.table,
        raw_reply: Some(extraction.raw_reply),
    })
}
