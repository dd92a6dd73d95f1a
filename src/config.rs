//! Configuration management.
//!
//! Configuration is read from environment variables:
//! - `TICKERCHAT_MODEL` - Optional. Ollama model to chat with. Defaults to `qwen3:4b-instruct`.
//! - `OLLAMA_HOST` - Optional. Ollama server URL. Defaults to `http://localhost:11434`.
//! - `TICKERCHAT_MAX_TOOL_ROUNDS` - Optional. Tool rounds allowed per user turn. Defaults to `1`.
//! - `TICKERCHAT_LLM_TIMEOUT_SECS` - Optional. HTTP timeout for model calls. Defaults to `300`.
//! - `TICKERCHAT_QUOTE_URL` - Optional. Quote service base URL. Defaults to Yahoo Finance.
//! - `TICKERCHAT_QUOTE_TIMEOUT_SECS` - Optional. HTTP timeout for quote lookups. Defaults to `15`.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "qwen3:4b-instruct";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_QUOTE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model identifier passed on every chat request
    pub model: String,

    /// Ollama server base URL
    pub ollama_host: String,

    /// Tool-execution rounds allowed per user turn; the model response
    /// after the last round is final even if it requests more tools
    pub max_tool_rounds: u32,

    /// HTTP timeout for model calls
    pub llm_timeout: Duration,

    /// Base URL of the quote service used by `get_stock_price`
    pub quote_base_url: String,

    /// HTTP timeout for quote lookups
    pub quote_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            max_tool_rounds: 1,
            llm_timeout: Duration::from_secs(300),
            quote_base_url: DEFAULT_QUOTE_URL.to_string(),
            quote_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            model: get("TICKERCHAT_MODEL").unwrap_or(defaults.model),
            ollama_host: get("OLLAMA_HOST")
                .map(|host| normalize_host(&host))
                .unwrap_or(defaults.ollama_host),
            max_tool_rounds: parse_var("TICKERCHAT_MAX_TOOL_ROUNDS", get("TICKERCHAT_MAX_TOOL_ROUNDS"))?
                .unwrap_or(defaults.max_tool_rounds),
            llm_timeout: parse_var("TICKERCHAT_LLM_TIMEOUT_SECS", get("TICKERCHAT_LLM_TIMEOUT_SECS"))?
                .map_or(defaults.llm_timeout, Duration::from_secs),
            quote_base_url: get("TICKERCHAT_QUOTE_URL").unwrap_or(defaults.quote_base_url),
            quote_timeout: parse_var(
                "TICKERCHAT_QUOTE_TIMEOUT_SECS",
                get("TICKERCHAT_QUOTE_TIMEOUT_SECS"),
            )?
            .map_or(defaults.quote_timeout, Duration::from_secs),
        })
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string(), v.clone()))
        })
        .transpose()
}

/// `OLLAMA_HOST` is commonly set as a bare `host:port` (the server's own
/// listen syntax); give it a scheme so it can be used as a URL.
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
