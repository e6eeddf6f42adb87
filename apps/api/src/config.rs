use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::matching::batch::DEFAULT_CONCURRENCY;

const DEFAULT_PORT: u16 = 8080;
/// 10 MiB, matching the upload cap of the document endpoints.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Read once at startup; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent keys are tolerated here and rejected by `LlmClient::new`.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub batch_concurrency: usize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?.max(1),
            batch_concurrency: parse_env("BATCH_CONCURRENCY", DEFAULT_CONCURRENCY)?.max(1),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The slice of configuration handed to the model client.
    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.llm_model.clone(),
            timeout_secs: self.llm_timeout_secs,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("JOBMATCH_TEST_UNSET_PORT", 9000).unwrap();
        assert_eq!(value, 9000);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("JOBMATCH_TEST_BAD_TIMEOUT", "soon");
        let result: Result<u64> = parse_env("JOBMATCH_TEST_BAD_TIMEOUT", 60);
        assert!(result.is_err());
        std::env::remove_var("JOBMATCH_TEST_BAD_TIMEOUT");
    }

    #[test]
    fn test_zero_timeout_from_env_is_raised_to_one() {
        std::env::set_var("LLM_TIMEOUT_SECS", "0");
        let config = Config::from_env().unwrap();
        std::env::remove_var("LLM_TIMEOUT_SECS");
        assert_eq!(config.llm_timeout_secs, 1);
    }

    #[test]
    fn test_blank_optional_env_is_none() {
        std::env::set_var("JOBMATCH_TEST_BLANK_KEY", "   ");
        assert!(optional_env("JOBMATCH_TEST_BLANK_KEY").is_none());
        std::env::remove_var("JOBMATCH_TEST_BLANK_KEY");
    }

    #[test]
    fn test_llm_settings_carry_config_values() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: "http://localhost:9999/v1".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            llm_timeout_secs: 5,
            batch_concurrency: 2,
            max_upload_bytes: 1024,
            port: 8080,
            rust_log: "debug".to_string(),
        };
        let settings = config.llm_settings();
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.timeout_secs, 5);
    }
}
