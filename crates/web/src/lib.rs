//! # vizon-web: Website Acquisition Plugin
//!
//! Fetches a web page and reduces it to its visible text. A failed fetch is
//! not an error for the pipeline: the failure description becomes the text
//! handed to the Extraction Service.

use reqwest::{redirect::Policy, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;
use vizon::ingest::{RawInput, MAX_TEXT_CHARS};

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_USER_AGENT: &str = concat!("vizon/", env!("CARGO_PKG_VERSION"));

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum WebFetchError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Failed to fetch content: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Server responded with status {status}")]
    Status { status: u16 },
}

// --- Data Structures ---

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WebFetchOptions {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub max_chars: usize,
    pub user_agent: String,
}

impl Default for WebFetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_chars: MAX_TEXT_CHARS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// An HTTP client configured for page fetching. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WebFetcher {
    client: Client,
    options: WebFetchOptions,
}

impl WebFetcher {
    pub fn new(options: WebFetchOptions) -> Result<Self, WebFetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .redirect(Policy::limited(options.max_redirects))
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(WebFetchError::ClientBuild)?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &WebFetchOptions {
        &self.options
    }

    /// Fetches `url` and returns its visible text, capped at `max_chars` characters.
    #[instrument(skip(self))]
    pub async fn fetch_web_content(&self, url: &str) -> Result<String, WebFetchError> {
        let parsed = Url::parse(url.trim()).map_err(|source| WebFetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WebFetchError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        info!("Fetching page: {parsed}");
        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                WebFetchError::Timeout(self.options.timeout_secs)
            } else {
                WebFetchError::Fetch(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebFetchError::Status {
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let text = vizon_html::visible_text(&html, self.options.max_chars);
        info!("Extracted {} characters of visible text", text.chars().count());
        Ok(text)
    }

    /// Acquires a page as a `RawInput::Text`. Never fails.
    ///
    /// On failure the text is `Error scraping URL: <description>`.
    pub async fn fetch_page_text(&self, url: &str) -> RawInput {
        match self.fetch_web_content(url).await {
            Ok(text) => RawInput::text(text),
            Err(e) => {
                warn!("Failed to scrape {url}: {e}");
                RawInput::text(format!("Error scraping URL: {e}"))
            }
        }
    }
}
