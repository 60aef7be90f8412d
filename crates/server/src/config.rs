//! # Application Configuration
//!
//! Loads the `vizon-server` configuration from `config.yml`, an optional
//! `secrets.yml` and environment variables, layered with the `config` crate.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};
use vizon::{
    extraction::NestedValuePolicy,
    prompts::tasks::{CHAT_ANALYST_TEMPLATE, IMAGE_EXTRACTION_HINT, WEB_EXTRACTION_HINT},
    providers::{
        ai::{GenerationParams, ProviderOptions, DEFAULT_REQUEST_TIMEOUT_SECS},
        factory::{ProviderKind, ProviderSpec},
    },
};
use vizon_web::WebFetchOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates a required configuration file was not found.
    #[error("{0}")]
    NotFound(String),
    /// The selected provider needs an API key and none was supplied.
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub web: WebFetchOptions,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Upper bound on an uploaded file or image, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Lowest-precedence key source, read from `secrets.yml` or `GOOGLE_API_KEY`.
    #[serde(default)]
    pub google_api_key: Option<String>,
}

fn default_port() -> u16 {
    9090
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// The Extraction Service connection.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Optional for Gemini, where it is derived from the model name.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model_name: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let generation = GenerationParams::default();
        Self {
            kind: ProviderKind::Gemini,
            api_url: None,
            api_key: None,
            model_name: "gemini-1.5-flash".to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            temperature: generation.temperature,
            top_p: generation.top_p,
            top_k: generation.top_k,
            max_output_tokens: generation.max_output_tokens,
        }
    }
}

impl ProviderConfig {
    pub fn options(&self) -> ProviderOptions {
        ProviderOptions {
            generation: GenerationParams {
                temperature: self.temperature,
                top_p: self.top_p,
                top_k: self.top_k,
                max_output_tokens: self.max_output_tokens,
            },
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn spec(&self) -> ProviderSpec<'_> {
        ProviderSpec {
            kind: self.kind,
            api_url: self.api_url.as_deref(),
            api_key: self.api_key.as_deref(),
            model_name: &self.model_name,
            options: self.options(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub nested_values: NestedValuePolicy,
    pub image_hint: String,
    pub web_hint: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            nested_values: NestedValuePolicy::default(),
            image_hint: IMAGE_EXTRACTION_HINT.to_string(),
            web_hint: WEB_EXTRACTION_HINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    /// Placeholders: `{data_context}`, `{question}`
    pub template: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            template: CHAT_ANALYST_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Picks the API key by precedence: prefixed env, `GOOGLE_API_KEY`, `config.yml`, `secrets.yml`.
fn resolve_api_key(config: &mut AppConfig) {
    let prefixed = non_blank(env::var("VIZON_PROVIDER__API_KEY").ok()).is_some();
    if !prefixed {
        if let Some(key) = non_blank(env::var("GOOGLE_API_KEY").ok()) {
            config.provider.api_key = Some(key);
            return;
        }
    }
    config.provider.api_key =
        non_blank(config.provider.api_key.take()).or_else(|| non_blank(config.google_api_key.clone()));
}

/// Loads the application configuration from files and environment variables.
///
/// - `config.yml` is optional unless `config_path_override` names it, in which
///   case it must exist. `secrets.yml` is read from the same directory.
/// - Top-level keys like `port` are overridden by `PORT`.
/// - Nested keys are overridden by `VIZON_...` variables (e.g., `VIZON_PROVIDER__MODEL_NAME`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("port", i64::from(default_port()))?;

    // Layer 2: Main Config
    let (main_config_path, config_dir) = match config_path_override {
        Some(override_path) => {
            let path = Path::new(override_path).to_path_buf();
            if !path.exists() {
                return Err(ConfigError::NotFound(format!(
                    "Config file not found at '{override_path}'."
                )));
            }
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| Path::new(".").to_path_buf());
            (path, dir)
        }
        None => (
            Path::new(base_path).join("config.yml"),
            Path::new(base_path).to_path_buf(),
        ),
    };

    match read_and_substitute(&main_config_path)? {
        Some(content) => {
            info!(
                "Loading configuration from '{}'.",
                main_config_path.display()
            );
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => info!(
            "'{}' not found. Using defaults and environment.",
            main_config_path.display()
        ),
    }

    // Layer 3: Secrets (Optional)
    let secrets_path = config_dir.join("secrets.yml");
    if let Some(secrets_content) = read_and_substitute(&secrets_path)? {
        info!("Loading secrets from '{}'.", secrets_path.display());
        builder = builder.add_source(File::from_str(&secrets_content, FileFormat::Yaml));
    }

    let settings = builder
        // Layer 4: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 5: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("VIZON")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    resolve_api_key(&mut config);

    match config.provider.kind {
        ProviderKind::Gemini if config.provider.api_key.is_none() => {
            return Err(ConfigError::MissingCredential(
                "the gemini provider needs an API key: set GOOGLE_API_KEY, \
                 provider.api_key in config.yml, or google_api_key in secrets.yml"
                    .to_string(),
            ));
        }
        ProviderKind::Local if config.provider.api_key.is_none() => {
            warn!("No API key configured for the local provider; sending requests without one.");
        }
        _ => {}
    }

    Ok(config)
}
