//! # Chat Assistant Handlers

use super::{load_session, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::{ChatHistory, ChatRequest, ChatResponse};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use vizon::chat::{ask, build_chat_prompt};

/// Handler for `GET /sessions/{id}/chat`.
pub async fn chat_history_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ChatHistory>>, AppError> {
    let session = load_session(&app_state, id).await?;
    let history = ChatHistory {
        messages: session.chat_history,
    };
    Ok(wrap_response(history, debug_params, None))
}

/// Handler for `POST /sessions/{id}/chat`.
///
/// The question is answered from a snapshot of the table. The exchange is
/// recorded once the answer arrives, unless a new table was loaded meanwhile.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let session = load_session(&app_state, id).await?;
    info!("Chat question for session {id}: '{}'", payload.question);

    let template = app_state.config.chat.template.as_str();
    let answer = ask(
        app_state.ai_provider.as_ref(),
        session.table.as_ref(),
        &payload.question,
        Some(template),
    )
    .await?;

    let question = payload.question.clone();
    let recorded_answer = answer.clone();
    let generation = session.table_generation;
    let recorded = app_state
        .sessions
        .update(id, move |s| {
            s.record_exchange_for(generation, question, recorded_answer)
        })
        .await
        .ok_or(AppError::SessionNotFound(id))?;
    if !recorded {
        warn!("Session {id} loaded a new table during the chat call; answer not recorded");
    }

    let debug_info = session
        .table
        .as_ref()
        .map(|table| json!({ "prompt": build_chat_prompt(template, table, &payload.question) }));
    Ok(wrap_response(ChatResponse { answer }, debug_params, debug_info))
}
