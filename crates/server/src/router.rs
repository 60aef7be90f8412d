use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = app_state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/sessions", post(handlers::create_session_handler))
        .route("/sessions/{id}", delete(handlers::delete_session_handler))
        .route(
            "/sessions/{id}/ingest/file",
            post(handlers::ingest_file_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/sessions/{id}/ingest/image",
            post(handlers::ingest_image_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/sessions/{id}/ingest/url", post(handlers::ingest_url_handler))
        .route("/sessions/{id}/table", get(handlers::table_handler))
        .route("/sessions/{id}/dashboard", get(handlers::dashboard_handler))
        .route("/sessions/{id}/export", get(handlers::export_handler))
        .route(
            "/sessions/{id}/chat",
            get(handlers::chat_history_handler).post(handlers::chat_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
