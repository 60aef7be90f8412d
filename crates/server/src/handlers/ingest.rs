//! # Ingestion Route Handlers
//!
//! One handler per source. Each runs the pipeline to completion and replaces the
//! session's table only when the run succeeded.

use super::{load_session, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::{
    pipeline::{self, PipelineOutcome},
    types::{IngestResponse, IngestUrlRequest},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use vizon::types::infer_schema;

/// A file pulled out of a multipart body, plus the optional `hint` field.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
    hint: Option<String>,
}

async fn read_upload(mut multipart: Multipart, default_name: &str) -> Result<Upload, AppError> {
    let mut file = None;
    let mut hint = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or(default_name).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?
                    .to_vec();
                file = Some((file_name, bytes));
            }
            "hint" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read hint: {e}")))?;
                hint = Some(text).filter(|h| !h.trim().is_empty());
            }
            _ => warn!("Ignoring unknown multipart field: {}", name),
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Multipart field 'file' is missing".to_string()))?;
    Ok(Upload {
        file_name,
        bytes,
        hint,
    })
}

/// Stores a successful outcome in the session and builds the response.
async fn commit(
    app_state: &AppState,
    id: Uuid,
    outcome: PipelineOutcome,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<IngestResponse>>, AppError> {
    let response = IngestResponse {
        source: outcome.source,
        records: outcome.table.len(),
        columns: outcome.table.columns().to_vec(),
    };
    let debug_info = json!({
        "schema": infer_schema(&outcome.table),
        "raw_reply": outcome.raw_reply,
    });

    app_state
        .sessions
        .update(id, |session| session.load_table(outcome.table, outcome.source))
        .await
        .ok_or(AppError::SessionNotFound(id))?;
    info!(
        "Session {id} now holds {} records from {}",
        response.records, response.source
    );

    Ok(wrap_response(response, debug_params, Some(debug_info)))
}

/// Handler for `POST /sessions/{id}/ingest/file` (multipart field `file`).
pub async fn ingest_file_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<IngestResponse>>, AppError> {
    load_session(&app_state, id).await?;
    let upload = read_upload(multipart, "uploaded_file.csv").await?;
    info!(
        "Received file '{}' for session {id} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let outcome = pipeline::run_file(upload.bytes, &upload.file_name).await?;
    commit(&app_state, id, outcome, debug_params).await
}

/// Handler for `POST /sessions/{id}/ingest/image` (multipart `file`, optional `hint`).
pub async fn ingest_image_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<IngestResponse>>, AppError> {
    load_session(&app_state, id).await?;
    let upload = read_upload(multipart, "uploaded_image").await?;
    info!(
        "Received image '{}' for session {id} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let outcome = pipeline::run_image(&app_state, upload.bytes, upload.hint.as_deref()).await?;
    commit(&app_state, id, outcome, debug_params).await
}

/// Handler for `POST /sessions/{id}/ingest/url`.
pub async fn ingest_url_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<IngestUrlRequest>,
) -> Result<Json<ApiResponse<IngestResponse>>, AppError> {
    load_session(&app_state, id).await?;
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("'url' must not be empty".to_string()));
    }
    info!("Received URL '{url}' for session {id}");

    let hint = payload.hint.as_deref().filter(|h| !h.trim().is_empty());
    let outcome = pipeline::run_url(&app_state, url, hint).await?;
    commit(&app_state, id, outcome, debug_params).await
}
