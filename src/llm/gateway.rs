//! Model gateway: one `generate` call per turn, routed to the right provider

use super::{
    GatewayError, LlmMessage, LlmRequest, LlmService, LoggingService, MessageRole, Provider,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Proxy base URL fronting both providers (e.g., `http://169.254.169.254/gateway/llm`)
    pub gateway: Option<String>,
}

impl LlmConfig {
    /// Read provider settings through `lookup` (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            anthropic_api_key: lookup(Provider::Anthropic.api_key_env_var()),
            openai_api_key: lookup(Provider::OpenAI.api_key_env_var()),
            gateway: lookup("LLM_GATEWAY"),
        }
    }

    fn api_key(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::Anthropic => self.anthropic_api_key.as_ref(),
            Provider::OpenAI => self.openai_api_key.as_ref(),
        }
    }
}

/// Dispatches generation requests to the provider serving each model id.
///
/// Provider clients are handed in at construction; nothing here reads
/// process-wide state.
pub struct ModelGateway {
    services: HashMap<Provider, Arc<dyn LlmService>>,
    system_prompt: String,
    max_tokens: u32,
}

impl ModelGateway {
    /// Build provider clients from configuration, skipping providers without credentials
    pub fn new(config: &LlmConfig, system_prompt: impl Into<String>, max_tokens: u32) -> Self {
        let services = Provider::ALL
            .into_iter()
            .filter_map(|provider| Self::try_create_service(provider, config))
            .collect::<Vec<_>>();

        Self::with_services(services, system_prompt, max_tokens)
    }

    /// Build a gateway over explicit provider clients (stubs in tests)
    pub fn with_services(
        services: impl IntoIterator<Item = Arc<dyn LlmService>>,
        system_prompt: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        let services = services
            .into_iter()
            .map(|service| (service.provider(), service))
            .collect();

        Self {
            services,
            system_prompt: system_prompt.into(),
            max_tokens,
        }
    }

    fn try_create_service(provider: Provider, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode the proxy handles authentication
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            config.api_key(provider)?.clone()
        };

        match provider.create_service(&api_key, config.gateway.as_deref()) {
            Ok(service) => Some(Arc::new(LoggingService::new(service))),
            Err(e) => {
                tracing::debug!(provider = %provider, error = %e, "Provider not available");
                None
            }
        }
    }

    /// Providers with a configured client, in declaration order
    pub fn available_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.services.contains_key(p))
            .collect()
    }

    /// Check that a model id routes to a configured provider
    pub fn ensure_supported(&self, model_id: &str) -> Result<Provider, GatewayError> {
        self.resolve(model_id).map(|service| service.provider())
    }

    fn resolve(&self, model_id: &str) -> Result<&Arc<dyn LlmService>, GatewayError> {
        let provider = Provider::for_model(model_id)
            .ok_or_else(|| GatewayError::UnsupportedModel(model_id.to_string()))?;

        self.services
            .get(&provider)
            .ok_or_else(|| GatewayError::ProviderNotConfigured {
                model_id: model_id.to_string(),
                provider,
            })
    }

    /// Generate the next reply for `model_id` given its conversation so far
    pub async fn generate(
        &self,
        model_id: &str,
        history: &[LlmMessage],
    ) -> Result<String, GatewayError> {
        let service = self.resolve(model_id)?;

        if service.provider().requires_trailing_user_turn()
            && history.last().map(|m| m.role) != Some(MessageRole::User)
        {
            return Err(GatewayError::InvalidHistory {
                model_id: model_id.to_string(),
                reason: "history must end with a user message",
            });
        }

        let request = LlmRequest {
            model: model_id.to_string(),
            system: Some(self.system_prompt.clone()),
            messages: history.to_vec(),
            max_tokens: Some(self.max_tokens),
        };

        let response = service.complete(&request).await?;
        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockLlmService;
    use crate::llm::{LlmError, LlmErrorKind, LlmResponse};

    fn gateway_with(mocks: &[Arc<MockLlmService>]) -> ModelGateway {
        ModelGateway::with_services(
            mocks.iter().map(|m| m.clone() as Arc<dyn LlmService>),
            "shared goal",
            1024,
        )
    }

    #[test]
    fn test_no_api_keys_no_providers() {
        let gateway = ModelGateway::new(&LlmConfig::default(), "prompt", 1024);
        assert!(gateway.available_providers().is_empty());
    }

    #[test]
    fn test_anthropic_key_only() {
        let config = LlmConfig {
            anthropic_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let gateway = ModelGateway::new(&config, "prompt", 1024);
        assert_eq!(gateway.available_providers(), vec![Provider::Anthropic]);
        assert!(matches!(
            gateway.ensure_supported("gpt-4"),
            Err(GatewayError::ProviderNotConfigured { provider: Provider::OpenAI, .. })
        ));
    }

    #[test]
    fn test_gateway_enables_all_providers() {
        let config = LlmConfig {
            gateway: Some("https://example.com".to_string()),
            ..Default::default()
        };
        let gateway = ModelGateway::new(&config, "prompt", 1024);
        assert_eq!(
            gateway.available_providers(),
            vec![Provider::Anthropic, Provider::OpenAI]
        );
    }

    #[test]
    fn test_empty_key_is_not_a_provider() {
        let config = LlmConfig {
            openai_api_key: Some(String::new()),
            ..Default::default()
        };
        let gateway = ModelGateway::new(&config, "prompt", 1024);
        assert!(gateway.available_providers().is_empty());
    }

    #[tokio::test]
    async fn test_routes_by_prefix_and_injects_system_prompt() {
        let openai = Arc::new(MockLlmService::new(Provider::OpenAI));
        let anthropic = Arc::new(MockLlmService::new(Provider::Anthropic));
        openai.queue_text("from gpt");
        anthropic.queue_text("from claude");
        let gateway = gateway_with(&[openai.clone(), anthropic.clone()]);

        let history = vec![LlmMessage::user("Define enlightenment.")];
        assert_eq!(gateway.generate("gpt-4", &history).await.unwrap(), "from gpt");
        assert_eq!(
            gateway
                .generate("claude-3-opus-20240229", &history)
                .await
                .unwrap(),
            "from claude"
        );

        let gpt_requests = openai.recorded_requests();
        assert_eq!(gpt_requests.len(), 1);
        assert_eq!(gpt_requests[0].model, "gpt-4");
        assert_eq!(gpt_requests[0].system.as_deref(), Some("shared goal"));
        assert_eq!(gpt_requests[0].max_tokens, Some(1024));
        assert_eq!(gpt_requests[0].messages, history);

        let claude_requests = anthropic.recorded_requests();
        assert_eq!(claude_requests[0].model, "claude-3-opus-20240229");
        assert_eq!(claude_requests[0].system.as_deref(), Some("shared goal"));
    }

    #[tokio::test]
    async fn test_unsupported_model_never_reaches_a_provider() {
        let openai = Arc::new(MockLlmService::new(Provider::OpenAI));
        let gateway = gateway_with(&[openai.clone()]);

        let err = gateway
            .generate("foo-1", &[LlmMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedModel(ref id) if id == "foo-1"));
        assert!(openai.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_anthropic_requires_trailing_user_turn() {
        let anthropic = Arc::new(MockLlmService::new(Provider::Anthropic));
        let gateway = gateway_with(&[anthropic.clone()]);

        let empty = gateway.generate("claude-3-haiku", &[]).await.unwrap_err();
        assert!(matches!(empty, GatewayError::InvalidHistory { .. }));

        let own_turn = gateway
            .generate(
                "claude-3-haiku",
                &[LlmMessage::user("q"), LlmMessage::assistant("a")],
            )
            .await
            .unwrap_err();
        assert!(matches!(own_turn, GatewayError::InvalidHistory { .. }));
        assert!(anthropic.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_openai_accepts_empty_history() {
        let openai = Arc::new(MockLlmService::new(Provider::OpenAI));
        openai.queue_response(LlmResponse::text_only("opening"));
        let gateway = gateway_with(&[openai.clone()]);

        assert_eq!(gateway.generate("gpt-4o", &[]).await.unwrap(), "opening");
        assert!(openai.recorded_requests()[0].messages.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let openai = Arc::new(MockLlmService::new(Provider::OpenAI));
        openai.queue_error(LlmError::rate_limit("slow down"));
        let gateway = gateway_with(&[openai]);

        let err = gateway
            .generate("gpt-4", &[LlmMessage::user("hi")])
            .await
            .unwrap_err();
        match err {
            GatewayError::Transport(e) => assert_eq!(e.kind, LlmErrorKind::RateLimit),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
