use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;
use vizon::{chat::ChatError, ExtractionError, PromptError};

/// A custom error type for the server application.
///
/// Each variant maps to one HTTP status and a JSON body `{error, kind}`.
#[derive(Debug)]
pub enum AppError {
    /// A failed pipeline run, tagged with the failing stage.
    Extraction(ExtractionError),
    /// The chat assistant could not answer.
    Chat(ChatError),
    SessionNotFound(Uuid),
    /// The session holds no table yet.
    NoData,
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Chat(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

fn service_status(err: &PromptError) -> StatusCode {
    match err {
        PromptError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        PromptError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        PromptError::ReqwestClientBuild(_) | PromptError::MissingApiKey => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, kind, error_message) = match self {
            AppError::Extraction(err) => {
                error!("ExtractionError ({}): {:?}", err.kind(), err);
                let status = match &err {
                    ExtractionError::Acquisition(_) | ExtractionError::Normalization(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    ExtractionError::Service(e) => service_status(e),
                };
                (status, err.kind(), err.to_string())
            }
            AppError::Chat(err) => {
                error!("ChatError: {:?}", err);
                let message = err.to_string();
                match err {
                    ChatError::NoData => (StatusCode::CONFLICT, "no_data", message),
                    ChatError::EmptyQuestion => (StatusCode::BAD_REQUEST, "bad_request", message),
                    ChatError::Service(e) => (service_status(&e), "service", message),
                }
            }
            AppError::SessionNotFound(id) => {
                error!("Unknown session: {id}");
                (
                    StatusCode::NOT_FOUND,
                    "session_not_found",
                    format!("Session '{id}' not found"),
                )
            }
            AppError::NoData => {
                error!("Request needs data but the session has none");
                (
                    StatusCode::CONFLICT,
                    "no_data",
                    ChatError::NoData.to_string(),
                )
            }
            AppError::BadRequest(msg) => {
                error!("Bad request: {msg}");
                (StatusCode::BAD_REQUEST, "bad_request", msg)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status_code, body).into_response()
    }
}
