//! # Application State
//!
//! The shared application state (`AppState`) and the logic for building it at
//! startup: the configuration, the AI provider client, the page fetcher and
//! the session store.

use crate::config::AppConfig;
use std::sync::Arc;
use tracing::info;
use vizon::{
    providers::{ai::AiProvider, factory::create_provider},
    SessionStore,
};
use vizon_web::WebFetcher;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded at startup.
    pub config: Arc<AppConfig>,
    /// The Extraction Service client, shared by extraction and chat.
    pub ai_provider: Arc<dyn AiProvider>,
    pub web_fetcher: WebFetcher,
    pub sessions: SessionStore,
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = create_provider(config.provider.spec())?;
    info!(
        "Using {:?} provider with model '{}'",
        config.provider.kind, config.provider.model_name
    );
    app_state_with_provider(config, ai_provider)
}

/// Builds the state around an already constructed provider, e.g. a mock in tests.
pub fn app_state_with_provider(
    config: AppConfig,
    ai_provider: Box<dyn AiProvider>,
) -> anyhow::Result<AppState> {
    let web_fetcher = WebFetcher::new(config.web.clone())?;
    Ok(AppState {
        config: Arc::new(config),
        ai_provider: Arc::from(ai_provider),
        web_fetcher,
        sessions: SessionStore::new(),
    })
}
