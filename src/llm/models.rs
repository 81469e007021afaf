//! Provider definitions and model-id routing
//!
//! Model identifiers are free-form strings chosen by the operator; the
//! provider is derived from the identifier's family prefix.

use super::{AnthropicService, LlmService, OpenAIService};
use std::sync::Arc;

/// LLM provider enumeration. Closed set: every supported backend is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

/// Model family prefixes and the provider serving them
const MODEL_PREFIXES: &[(&str, Provider)] = &[
    ("claude", Provider::Anthropic),
    ("gpt", Provider::OpenAI),
];

impl Provider {
    /// All supported providers
    pub const ALL: [Provider; 2] = [Provider::Anthropic, Provider::OpenAI];

    /// Route a model identifier to its provider, `None` for unknown families
    pub fn for_model(model_id: &str) -> Option<Provider> {
        MODEL_PREFIXES
            .iter()
            .find(|(prefix, _)| model_id.starts_with(prefix))
            .map(|(_, provider)| *provider)
    }

    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Anthropic rejects conversations that do not end on a user turn;
    /// `OpenAI` accepts a bare system message.
    pub fn requires_trailing_user_turn(self) -> bool {
        matches!(self, Provider::Anthropic)
    }

    /// Build the transport client for this provider
    pub fn create_service(
        self,
        api_key: &str,
        gateway: Option<&str>,
    ) -> Result<Arc<dyn LlmService>, String> {
        if api_key.is_empty() {
            return Err(format!(
                "{} requires {} or gateway",
                self.display_name(),
                self.api_key_env_var()
            ));
        }
        let service: Arc<dyn LlmService> = match self {
            Provider::Anthropic => Arc::new(AnthropicService::new(api_key.to_string(), gateway)?),
            Provider::OpenAI => Arc::new(OpenAIService::new(api_key.to_string(), gateway)?),
        };
        Ok(service)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
