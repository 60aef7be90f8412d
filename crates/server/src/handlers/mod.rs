//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `vizon-server`.
//! The handlers are split into logical sub-modules based on their functionality.

pub mod chat;
pub mod data;
pub mod general;
pub mod ingest;
pub mod sessions;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use chat::*;
pub use data::*;
pub use general::*;
pub use ingest::*;
pub use sessions::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use serde_json::Value;
use uuid::Uuid;
use vizon::Session;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}

/// Looks up a session snapshot and marks it active.
pub(crate) async fn load_session(app_state: &AppState, id: Uuid) -> Result<Session, AppError> {
    if !app_state.sessions.touch(id).await {
        return Err(AppError::SessionNotFound(id));
    }
    app_state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound(id))
}
