// src/infrastructure/config.rs
use std::time::Duration;

use tracing::debug;

use crate::domain::ConfigError;
use crate::util::retry::RetryPolicy;

pub const DEFAULT_ANKICONNECT_URL: &str = "http://localhost:8765";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.tokenfactory.nebius.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-oss-20b";
pub const DEFAULT_DECK: &str = "sentence-mining";
pub const DEFAULT_NOTE_TYPE: &str = "Sentence Mining";
pub const DEFAULT_TODOIST_PROJECT: &str = "english-words";
pub const DEFAULT_REVIEW_LABEL: &str = "needs_review";

/// Process-wide immutable configuration, built once at startup from the
/// environment (after `.env` loading) and passed explicitly to each service.
#[derive(Debug, Clone)]
pub struct Config {
    pub todoist_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub ankiconnect_url: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub deck: String,
    pub note_type: String,
    pub todoist_project: String,
    pub review_label: String,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variables may come from the shell.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let max_attempts = parse_var(&get, "RETRY_MAX_ATTEMPTS", 3)?;
        let base_delay_ms = parse_var(&get, "RETRY_BASE_DELAY_MS", 500)?;

        let config = Self {
            todoist_api_key: secret("TODOIST_API_KEY"),
            llm_api_key: secret("LLM_API_KEY"),
            ankiconnect_url: or_default("ANKICONNECT_URL", DEFAULT_ANKICONNECT_URL),
            llm_base_url: or_default("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: or_default("LLM_MODEL", DEFAULT_LLM_MODEL),
            deck: or_default("ANKI_DECK", DEFAULT_DECK),
            note_type: or_default("ANKI_NOTE_TYPE", DEFAULT_NOTE_TYPE),
            todoist_project: or_default("TODOIST_PROJECT", DEFAULT_TODOIST_PROJECT),
            review_label: or_default("REVIEW_LABEL", DEFAULT_REVIEW_LABEL),
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(base_delay_ms),
            },
        };
        debug!(deck = %config.deck, project = %config.todoist_project, "Loaded configuration");
        Ok(config)
    }

    /// The LLM key is needed for every run.
    pub fn require_llm_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .ok_or(ConfigError::MissingVar("LLM_API_KEY"))
    }

    /// The Todoist key is only needed when mining from Todoist.
    pub fn require_todoist_key(&self) -> Result<&str, ConfigError> {
        self.todoist_api_key
            .as_deref()
            .ok_or(ConfigError::MissingVar("TODOIST_API_KEY"))
    }
}

fn parse_var<T: std::str::FromStr>(
    get: impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
    }
}
