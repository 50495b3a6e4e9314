//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for chat-completion providers:
//! - **OpenAI**: OpenAI API and compatible endpoints
//! - **Azure**: Azure OpenAI deployments (same wire format, different routing and auth)
//!
//! Clients are cheap to build and hold no conversation state, so callers create
//! one per invocation instead of sharing a process-wide instance.

use crate::agents::AgentDescriptor;
use crate::types::{ConversationMessage, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate with conversation history, tool definitions and request options
    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
        options: &RequestOptions,
    ) -> Result<LLMResponse>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = [
            ConversationMessage::system(system),
            ConversationMessage::user(prompt),
        ];
        let response = self
            .generate_with_tools_and_history(&messages, &[], &RequestOptions::default())
            .await?;
        Ok(response.content)
    }

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Response from an LLM generation request
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

impl LLMResponse {
    /// A plain final answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            finish_reason: "stop".to_string(),
            usage: None,
        }
    }

    /// A turn that requests tool calls.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            finish_reason: "tool_calls".to_string(),
            usage: None,
        }
    }
}

/// How the model may use the offered tools on a given turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
    Required,
    None,
}

/// JSON-schema constrained response format
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Per-request generation options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub tool_choice: ToolChoice,
    pub response_format: Option<ResponseFormat>,
    pub temperature: Option<f32>,
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Azure OpenAI deployment
    ///
    /// The deployment name doubles as the model name.
    Azure {
        api_key: String,
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

impl Provider {
    /// Create a client instance for this provider
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        self.create_client_with_temperature(None)
    }

    /// Create a client that falls back to `temperature` when a request sets none
    pub fn create_client_with_temperature(
        &self,
        temperature: Option<f32>,
    ) -> Result<Box<dyn LLMClient>> {
        let client = match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => super::openai::OpenAIClient::new(api_key.clone(), api_base.clone(), model.clone())?,
            Provider::Azure {
                api_key,
                endpoint,
                deployment,
                api_version,
            } => super::openai::OpenAIClient::azure(
                api_key.clone(),
                endpoint.clone(),
                deployment.clone(),
                api_version.clone(),
            )?,
        };
        Ok(Box::new(client.with_default_temperature(temperature)))
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Azure { .. } => "Azure",
        }
    }

    /// The model or deployment requests are sent to
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } => model,
            Provider::Azure { deployment, .. } => deployment,
        }
    }
}

/// Builds a fresh client for each agent invocation.
#[async_trait]
pub trait LLMClientFactoryTrait: Send + Sync {
    /// Create a client suited to the given agent
    async fn create_client(&self, descriptor: &AgentDescriptor) -> Result<Box<dyn LLMClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let openai = Provider::OpenAI {
            api_key: "".to_string(),
            api_base: "".to_string(),
            model: "gpt-4o-mini".to_string(),
        };
        assert_eq!(openai.name(), "OpenAI");
        assert_eq!(openai.model(), "gpt-4o-mini");

        let azure = Provider::Azure {
            api_key: "".to_string(),
            endpoint: "https://example.openai.azure.com".to_string(),
            deployment: "gpt-4.1".to_string(),
            api_version: "2024-02-01".to_string(),
        };
        assert_eq!(azure.name(), "Azure");
        assert_eq!(azure.model(), "gpt-4.1");
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::new(120, 30);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_response_constructors() {
        let text = LLMResponse::text("done");
        assert!(text.tool_calls.is_empty());
        assert_eq!(text.finish_reason, "stop");

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "web_search".to_string(),
            arguments: serde_json::json!({"query": "solar"}),
        };
        let calls = LLMResponse::with_tool_calls(vec![call]);
        assert_eq!(calls.tool_calls.len(), 1);
        assert_eq!(calls.finish_reason, "tool_calls");
    }

    #[test]
    fn test_default_options_are_auto() {
        let options = RequestOptions::default();
        assert_eq!(options.tool_choice, ToolChoice::Auto);
        assert!(options.response_format.is_none());
    }
}
