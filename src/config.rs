//! Process configuration, read once at startup
//!
//! Values come from the environment (after `.env` is loaded by `main`).
//! Empty variables count as unset.

use crate::dialogue::DialogueSettings;
use crate::llm::{GatewayError, LlmConfig, ModelGateway};
use crate::prompts::{DIALOGUE_SYSTEM_PROMPT, OPENING_PROMPT};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL_1: &str = "gpt-4";
pub const DEFAULT_MODEL_2: &str = "claude-3-opus-20240229";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TURN_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} is not usable: {source}")]
    Model {
        var: &'static str,
        #[source]
        source: GatewayError,
    },
}

/// Everything `main` needs to wire the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub dialogue: DialogueSettings,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let history_window = match get("HISTORY_WINDOW") {
            None => None,
            Some(raw) => Some(parse_positive::<usize>("HISTORY_WINDOW", &raw)?),
        };

        let turn_delay_ms = parse_or(
            "CHAMBER_TURN_DELAY_MS",
            get("CHAMBER_TURN_DELAY_MS"),
            DEFAULT_TURN_DELAY_MS,
        )?;

        let dialogue = DialogueSettings {
            model_1: get("MODEL_1").unwrap_or_else(|| DEFAULT_MODEL_1.to_string()),
            model_2: get("MODEL_2").unwrap_or_else(|| DEFAULT_MODEL_2.to_string()),
            opening_prompt: get("OPENING_PROMPT").unwrap_or_else(|| OPENING_PROMPT.to_string()),
            turn_delay: Duration::from_millis(turn_delay_ms),
            history_window,
            transcript_dir: get("CHAMBER_TRANSCRIPT_DIR")
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
        };

        let max_tokens = match get("CHAMBER_MAX_TOKENS") {
            None => DEFAULT_MAX_TOKENS,
            Some(raw) => parse_positive("CHAMBER_MAX_TOKENS", &raw)?,
        };

        Ok(Self {
            llm: LlmConfig::from_lookup(&get),
            dialogue,
            system_prompt: get("SYSTEM_PROMPT")
                .unwrap_or_else(|| DIALOGUE_SYSTEM_PROMPT.to_string()),
            max_tokens,
            port: parse_or("CHAMBER_PORT", get("CHAMBER_PORT"), DEFAULT_PORT)?,
        })
    }

    /// Reject configured model ids the gateway cannot serve, before any run starts
    pub fn validate(&self, gateway: &ModelGateway) -> Result<(), ConfigError> {
        for (var, model_id) in [
            ("MODEL_1", &self.dialogue.model_1),
            ("MODEL_2", &self.dialogue.model_2),
        ] {
            gateway
                .ensure_supported(model_id)
                .map_err(|source| ConfigError::Model { var, source })?;
        }
        Ok(())
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_positive<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value: T = parse_or(var, Some(raw.to_string()), T::default())?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Provider;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.dialogue.model_1, "gpt-4");
        assert_eq!(config.dialogue.model_2, "claude-3-opus-20240229");
        assert_eq!(config.dialogue.opening_prompt, OPENING_PROMPT);
        assert_eq!(config.dialogue.turn_delay, Duration::from_secs(1));
        assert_eq!(config.dialogue.history_window, None);
        assert_eq!(config.dialogue.transcript_dir, PathBuf::from("."));
        assert_eq!(config.system_prompt, DIALOGUE_SYSTEM_PROMPT);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.port, 5000);
        assert!(config.llm.anthropic_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MODEL_1", "claude-3-5-sonnet-20241022"),
            ("MODEL_2", "gpt-4o"),
            ("CHAMBER_PORT", "8080"),
            ("CHAMBER_TURN_DELAY_MS", "0"),
            ("CHAMBER_TRANSCRIPT_DIR", "/var/lib/chamber"),
            ("HISTORY_WINDOW", "12"),
            ("CHAMBER_MAX_TOKENS", "2048"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ANTHROPIC_API_KEY", ""),
        ]))
        .unwrap();
        assert_eq!(config.dialogue.model_1, "claude-3-5-sonnet-20241022");
        assert_eq!(config.dialogue.model_2, "gpt-4o");
        assert_eq!(config.port, 8080);
        assert_eq!(config.dialogue.turn_delay, Duration::ZERO);
        assert_eq!(config.dialogue.transcript_dir, PathBuf::from("/var/lib/chamber"));
        assert_eq!(config.dialogue.history_window, Some(12));
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.llm.openai_api_key.as_deref(), Some("sk-test"));
        // Empty values count as unset
        assert!(config.llm.anthropic_api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("CHAMBER_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("CHAMBER_PORT"));

        let err = AppConfig::from_lookup(lookup(&[("HISTORY_WINDOW", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_validate_rejects_unsupported_model() {
        let config = AppConfig::from_lookup(lookup(&[("MODEL_2", "foo-1")])).unwrap();
        let gateway = ModelGateway::new(
            &LlmConfig {
                gateway: Some("https://example.com".to_string()),
                ..Default::default()
            },
            "prompt",
            1024,
        );
        let err = config.validate(&gateway).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Model { var: "MODEL_2", source: GatewayError::UnsupportedModel(_) }
        ));
    }

    #[test]
    fn test_validate_requires_provider_key() {
        let config =
            AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        let gateway = ModelGateway::new(&config.llm, "prompt", 1024);
        let err = config.validate(&gateway).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Model {
                var: "MODEL_2",
                source: GatewayError::ProviderNotConfigured { provider: Provider::Anthropic, .. }
            }
        ));
    }

    #[test]
    fn test_validate_accepts_configured_models() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ]))
        .unwrap();
        let gateway = ModelGateway::new(&config.llm, "prompt", 1024);
        assert!(config.validate(&gateway).is_ok());
    }
}
