//! # Session Lifecycle Handlers

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::SessionCreated;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Handler for `POST /sessions`.
pub async fn create_session_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> (StatusCode, Json<ApiResponse<SessionCreated>>) {
    let session = app_state.sessions.create().await;
    info!("Created session {}", session.id);
    let debug_info = json!({ "created_at": session.created_at });
    (
        StatusCode::CREATED,
        wrap_response(
            SessionCreated {
                session_id: session.id,
            },
            debug_params,
            Some(debug_info),
        ),
    )
}

/// Handler for `DELETE /sessions/{id}`. Drops the table and the chat history.
pub async fn delete_session_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if app_state.sessions.remove(id).await {
        info!("Deleted session {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id))
    }
}
