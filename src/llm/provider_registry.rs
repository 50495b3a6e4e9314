//! Provider Registry for resolving model aliases into concrete providers
//!
//! Model aliases (`default`, `coding`, ...) point at named providers in
//! `agentry.toml`. Resolution reads the referenced environment variables at
//! call time, so every invocation sees the current credentials and a missing
//! variable fails the call that needed it with a configuration error.

use crate::agents::AgentDescriptor;
use crate::llm::client::{LLMClient, LLMClientFactoryTrait, Provider};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{AgentryConfig, ModelConfig, ProviderConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Environment lookup used for credential resolution
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Registry for managing named LLM providers and model aliases
pub struct ProviderRegistry {
    /// Provider configurations keyed by name
    providers: HashMap<String, ProviderConfig>,
    /// Model aliases keyed by name
    models: HashMap<String, ModelConfig>,
    env: EnvLookup,
}

impl ProviderRegistry {
    /// Create a provider registry from TOML configuration, reading the process environment
    pub fn from_config(config: &AgentryConfig) -> Self {
        Self::with_env(config, Arc::new(|name: &str| std::env::var(name).ok()))
    }

    /// Create a registry with a custom environment lookup
    pub fn with_env(config: &AgentryConfig, env: EnvLookup) -> Self {
        Self {
            providers: config.providers.clone(),
            models: config.models.clone(),
            env,
        }
    }

    fn require_env(&self, name: &str) -> Result<String> {
        match (self.env)(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(AppError::Configuration(format!(
                "Environment variable '{}' is not set",
                name
            ))),
        }
    }

    /// Resolve a model alias into a fully credentialed provider
    pub fn resolve(&self, model_name: &str) -> Result<Provider> {
        let model_config = self.models.get(model_name).ok_or_else(|| {
            AppError::Configuration(format!("Model '{}' not found in configuration", model_name))
        })?;

        let provider_config = self.providers.get(&model_config.provider).ok_or_else(|| {
            AppError::Configuration(format!(
                "Provider '{}' referenced by model '{}' not found",
                model_config.provider, model_name
            ))
        })?;

        let model = match (&model_config.model, &model_config.model_env) {
            (Some(model), _) => model.clone(),
            (None, Some(env)) => self.require_env(env)?,
            (None, None) => {
                return Err(AppError::Configuration(format!(
                    "Model '{}' has no model name configured",
                    model_name
                )))
            }
        };

        match provider_config {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
            } => Ok(Provider::OpenAI {
                api_key: self.require_env(api_key_env)?,
                api_base: api_base.clone(),
                model,
            }),
            ProviderConfig::Azure {
                endpoint_env,
                api_key_env,
                api_version,
                api_version_env,
            } => {
                let api_version = api_version_env
                    .as_deref()
                    .and_then(|env| (self.env)(env))
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| api_version.clone());
                Ok(Provider::Azure {
                    api_key: self.require_env(api_key_env)?,
                    endpoint: self.require_env(endpoint_env)?,
                    deployment: model,
                    api_version,
                })
            }
        }
    }

    /// Create an LLM client for a model alias, carrying its configured temperature
    pub fn create_client_for_model(&self, model_name: &str) -> Result<Box<dyn LLMClient>> {
        self.resolve(model_name)?
            .create_client_with_temperature(self.temperature_for(model_name))
    }

    /// Temperature configured for a model alias
    pub fn temperature_for(&self, model_name: &str) -> Option<f32> {
        self.models.get(model_name).and_then(|m| m.temperature)
    }
}

/// Config-driven client factory.
///
/// Picks the model alias from the descriptor's `model` execution hint, falling
/// back to the configured default, and builds a brand-new client each call.
pub struct ConfigBasedLLMFactory {
    registry: Arc<ProviderRegistry>,
    default_model: String,
}

impl ConfigBasedLLMFactory {
    /// Create a new factory from a provider registry
    pub fn new(registry: Arc<ProviderRegistry>, default_model: &str) -> Self {
        Self {
            registry,
            default_model: default_model.to_string(),
        }
    }

    /// Create a factory from TOML configuration
    pub fn from_config(config: &AgentryConfig) -> Self {
        Self::new(
            Arc::new(ProviderRegistry::from_config(config)),
            &config.default_model,
        )
    }

    /// Model alias a descriptor resolves to
    pub fn model_for(&self, descriptor: &AgentDescriptor) -> String {
        descriptor
            .hint_str("model")
            .map(str::to_string)
            .unwrap_or_else(|| self.default_model.clone())
    }
}

#[async_trait]
impl LLMClientFactoryTrait for ConfigBasedLLMFactory {
    async fn create_client(&self, descriptor: &AgentDescriptor) -> Result<Box<dyn LLMClient>> {
        let model = self.model_for(descriptor);
        self.registry.create_client_for_model(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentDescriptor;

    fn env_from(pairs: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| map.get(name).cloned())
    }

    fn azure_env() -> EnvLookup {
        env_from(&[
            ("AZURE_BASE_URL", "https://example.openai.azure.com"),
            ("AZURE_API_KEY", "secret"),
            ("AZURE_MODEL_NAME", "gpt-4.1"),
            ("AZURE_MODEL_NAME_O4_MINI", "o4-mini"),
        ])
    }

    #[test]
    fn test_resolves_default_azure_model() {
        let registry = ProviderRegistry::with_env(&AgentryConfig::default(), azure_env());
        match registry.resolve("default").unwrap() {
            Provider::Azure {
                deployment,
                api_version,
                endpoint,
                ..
            } => {
                assert_eq!(deployment, "gpt-4.1");
                assert_eq!(api_version, "2024-02-01");
                assert_eq!(endpoint, "https://example.openai.azure.com");
            }
            other => panic!("expected azure provider, got {:?}", other),
        }
    }

    #[test]
    fn test_api_version_env_overrides_default() {
        let env = env_from(&[
            ("AZURE_BASE_URL", "https://example.openai.azure.com"),
            ("AZURE_API_KEY", "secret"),
            ("AZURE_MODEL_NAME", "gpt-4.1"),
            ("AZURE_API_VERSION", "2025-01-01-preview"),
        ]);
        let registry = ProviderRegistry::with_env(&AgentryConfig::default(), env);
        match registry.resolve("default").unwrap() {
            Provider::Azure { api_version, .. } => assert_eq!(api_version, "2025-01-01-preview"),
            other => panic!("expected azure provider, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let env = env_from(&[("AZURE_BASE_URL", "https://example.openai.azure.com")]);
        let registry = ProviderRegistry::with_env(&AgentryConfig::default(), env);
        let err = registry.resolve("default").unwrap_err();
        assert!(matches!(err, AppError::Configuration(msg) if msg.contains("AZURE_")));
    }

    #[test]
    fn test_unknown_alias() {
        let registry = ProviderRegistry::with_env(&AgentryConfig::default(), azure_env());
        assert!(matches!(
            registry.resolve("missing"),
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_factory_uses_model_hint() {
        let registry = Arc::new(ProviderRegistry::with_env(
            &AgentryConfig::default(),
            azure_env(),
        ));
        let factory = ConfigBasedLLMFactory::new(registry, "default");

        let coder = AgentDescriptor::builder("Coding-Agent")
            .hint("model", "coding")
            .build();
        assert_eq!(factory.model_for(&coder), "coding");
        let client = factory.create_client(&coder).await.unwrap();
        assert_eq!(client.model_name(), "o4-mini");

        let plain = AgentDescriptor::builder("Weather-Agent").build();
        let client = factory.create_client(&plain).await.unwrap();
        assert_eq!(client.model_name(), "gpt-4.1");
    }
}
