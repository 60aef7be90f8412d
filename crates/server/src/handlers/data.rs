//! # Table, Dashboard and Export Handlers

use super::{load_session, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use vizon::{
    dashboard::{dashboard_view, DashboardView},
    Table,
};

pub const EXPORT_FILE_NAME: &str = "vizon_extracted_data.csv";

/// Handler for `GET /sessions/{id}/table`: the raw table as `{columns, rows}`.
pub async fn table_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Table>>, AppError> {
    let session = load_session(&app_state, id).await?;
    let table = session.table.ok_or(AppError::NoData)?;
    let debug_info = json!({ "source": session.source });
    Ok(wrap_response(table, debug_params, Some(debug_info)))
}

/// Handler for `GET /sessions/{id}/dashboard`. Always succeeds for a live
/// session: without data it returns the landing payload.
pub async fn dashboard_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<DashboardView>>, AppError> {
    let session = load_session(&app_state, id).await?;
    let view = dashboard_view(session.table.as_ref());
    let debug_info = json!({ "source": session.source });
    Ok(wrap_response(view, debug_params, Some(debug_info)))
}

/// Handler for `GET /sessions/{id}/export`: the table as a CSV download.
pub async fn export_handler(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = load_session(&app_state, id).await?;
    let table = session.table.ok_or(AppError::NoData)?;
    let body = table.to_csv().map_err(anyhow::Error::from)?;
    info!("Exporting {} records for session {id}", table.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    ))
}
