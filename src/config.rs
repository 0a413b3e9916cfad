use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::caption::DEFAULT_CAPTION_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub extra_link: Option<ExtraLink>,
}

/// Where and how listing/detail pages are fetched
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Raw value of the `cat` query parameter, already percent-encoded
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            category: default_category(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://audiobookbay.lu".to_string()
}

fn default_category() -> String {
    "undefined%2Cundefined".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Chat front-end settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Users allowed to talk to the bot. Empty means everyone.
    #[serde(default)]
    pub allowed_users: Vec<i64>,
    #[serde(default = "default_caption_limit")]
    pub caption_limit: usize,
    #[serde(default = "default_stream_base_url")]
    pub stream_base_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            allowed_users: Vec::new(),
            caption_limit: default_caption_limit(),
            stream_base_url: default_stream_base_url(),
        }
    }
}

impl BotConfig {
    pub fn is_allowed(&self, user: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user)
    }
}

fn default_caption_limit() -> usize {
    DEFAULT_CAPTION_LIMIT
}

fn default_stream_base_url() -> String {
    "https://webtor.io/".to_string()
}

/// Additional button shown next to a revealed magnet link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtraLink {
    pub text: String,
    pub url: String,
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("BOOKBAY_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base = &config.source.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "source.base_url must be an http(s) URL, got {:?}",
            base
        )));
    }
    if config.source.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source.timeout_secs cannot be 0".to_string(),
        ));
    }
    if config.bot.caption_limit < 16 {
        return Err(ConfigError::ValidationError(
            "bot.caption_limit must be at least 16".to_string(),
        ));
    }
    Ok(())
}
