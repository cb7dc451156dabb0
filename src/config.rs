//! TOML configuration parsing and validation.
//!
//! A single file configures the record store backend, the AI endpoint used
//! by the summarization, image, and search collaborators, the placeholder
//! image, and the HTTP bind address.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// `"sqlite"` or `"json"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    pub path: PathBuf,
}

fn default_backend() -> String {
    "sqlite".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Model with built-in web search. When unset, the web-search strategies
    /// are skipped and only knowledge-only prompting is used.
    #[serde(default)]
    pub search_model: Option<String>,
    /// Image generation model. When unset, image generation is skipped.
    #[serde(default)]
    pub image_model: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Language the summaries are written in.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            search_model: None,
            image_model: None,
            api_key_env: default_api_key_env(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_language() -> String {
    "pt-BR".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    /// Substituted whenever the image collaborator fails or finds nothing.
    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            placeholder_url: default_placeholder_url(),
        }
    }
}

pub const DEFAULT_PLACEHOLDER_URL: &str = "https://placehold.co/600x400.png";

fn default_placeholder_url() -> String {
    DEFAULT_PLACEHOLDER_URL.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// A default configuration pointing at the given database path.
    pub fn minimal(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig {
                backend: default_backend(),
                path: db_path.into(),
            },
            ai: AiConfig::default(),
            image: ImageConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.db.backend.as_str() {
        "sqlite" | "json" => {}
        other => anyhow::bail!(
            "Unknown db backend: '{}'. Must be sqlite or json.",
            other
        ),
    }

    if config.ai.timeout_secs == 0 {
        anyhow::bail!("ai.timeout_secs must be > 0");
    }

    if !config.ai.base_url.starts_with("http") {
        anyhow::bail!("ai.base_url must be an http(s) URL");
    }

    if config.image.placeholder_url.trim().is_empty() {
        anyhow::bail!("image.placeholder_url must not be empty");
    }

    Ok(())
}
