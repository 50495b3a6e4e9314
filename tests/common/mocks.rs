//! Mock implementations for testing.
//!
//! Scripted LLM clients, a factory that hands them out per agent name, and
//! canned tools, so agent runs can be tested without any network access.

use agentry::agents::AgentDescriptor;
use agentry::llm::client::{LLMClientFactoryTrait, RequestOptions, ToolChoice};
use agentry::llm::{LLMClient, LLMResponse};
use agentry::tools::{Tool, ToolRegistry};
use agentry::types::{
    AppError, ConversationMessage, ExecutionErrorKind, MessageRole, Result, ToolCall,
    ToolDefinition,
};
use agentry::utils::toml_config::ExecutionConfig;
use agentry::AgentExecutor;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as seen by a mock client.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// Name of the agent the client was created for.
    pub agent: String,
    pub messages: Vec<ConversationMessage>,
    pub tools: Vec<ToolDefinition>,
    pub options: RequestOptions,
}

impl MockRequest {
    /// Number of model turns already taken in this invocation.
    pub fn turn(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count()
    }

    /// Content of the last user message.
    pub fn last_user(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    pub fn forced_tool(&self) -> bool {
        self.options.tool_choice == ToolChoice::Required
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

pub type Responder = Arc<dyn Fn(&MockRequest) -> Result<LLMResponse> + Send + Sync>;

/// Scripted LLM client.
///
/// The responder sees every request and decides the reply, so one client
/// can play a whole multi-turn invocation.
#[derive(Clone)]
pub struct MockLLMClient {
    agent: String,
    responder: Responder,
    delay: Option<Duration>,
    log: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockLLMClient {
    /// Always answers with the given text.
    pub fn new(response: &str) -> Self {
        let response = response.to_string();
        Self::scripted(move |_| Ok(LLMResponse::text(response.clone())))
    }

    /// Replies decided by `responder`.
    pub fn scripted<F>(responder: F) -> Self
    where
        F: Fn(&MockRequest) -> Result<LLMResponse> + Send + Sync + 'static,
    {
        Self {
            agent: String::new(),
            responder: Arc::new(responder),
            delay: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replies in order, one per model turn; the last one repeats.
    pub fn sequence(responses: Vec<LLMResponse>) -> Self {
        Self::scripted(move |request| {
            let index = request.turn().min(responses.len().saturating_sub(1));
            responses
                .get(index)
                .cloned()
                .ok_or_else(|| AppError::Internal("empty mock sequence".into()))
        })
    }

    /// Always fails with the given error kind.
    pub fn failing(kind: ExecutionErrorKind) -> Self {
        Self::scripted(move |_| Err(AppError::execution(kind, "Mock LLM failure")))
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
        options: &RequestOptions,
    ) -> Result<LLMResponse> {
        let request = MockRequest {
            agent: self.agent.clone(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            options: options.clone(),
        };
        if let Ok(mut log) = self.log.lock() {
            log.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Hands out a scripted client per agent name.
///
/// Agents without a script get a configuration error, like a real factory
/// missing credentials.
#[derive(Default)]
pub struct MockLLMFactory {
    clients: HashMap<String, MockLLMClient>,
    log: Arc<Mutex<Vec<MockRequest>>>,
    created: AtomicUsize,
    descriptors: Mutex<Vec<AgentDescriptor>>,
}

impl MockLLMFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the client used for `agent`.
    pub fn with_agent(mut self, agent: &str, client: MockLLMClient) -> Self {
        let client = MockLLMClient {
            agent: agent.to_string(),
            log: Arc::clone(&self.log),
            ..client
        };
        self.clients.insert(agent.to_string(), client);
        self
    }

    /// Every request made through any client, in arrival order.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn requests_for(&self, agent: &str) -> Vec<MockRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.agent == agent)
            .collect()
    }

    /// Number of clients built so far.
    pub fn clients_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Descriptors clients were requested for.
    pub fn descriptors(&self) -> Vec<AgentDescriptor> {
        self.descriptors
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LLMClientFactoryTrait for MockLLMFactory {
    async fn create_client(&self, descriptor: &AgentDescriptor) -> Result<Box<dyn LLMClient>> {
        if let Ok(mut seen) = self.descriptors.lock() {
            seen.push(descriptor.clone());
        }
        let client = self.clients.get(descriptor.name()).ok_or_else(|| {
            AppError::Configuration(format!(
                "Environment variable AZURE_API_KEY is not set (agent {})",
                descriptor.name()
            ))
        })?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(client.clone()))
    }
}

/// Tool returning a canned result or failing with a message.
pub struct StaticTool {
    name: String,
    outcome: std::result::Result<Value, String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticTool {
    pub fn ok(name: &str, result: Value) -> Self {
        Self {
            name: name.to_string(),
            outcome: Ok(result),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Err(message.to_string()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of executions.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Canned test tool"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(AppError::Tool)
    }
}

/// Build a tool call the way a model would request it.
pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

/// Registry holding only the given tools.
pub fn registry_with(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool);
    }
    Arc::new(registry)
}

/// Executor over a mock factory with default limits.
pub fn executor(factory: Arc<MockLLMFactory>, tools: Arc<ToolRegistry>) -> Arc<AgentExecutor> {
    executor_with(factory, tools, ExecutionConfig::default())
}

pub fn executor_with(
    factory: Arc<MockLLMFactory>,
    tools: Arc<ToolRegistry>,
    config: ExecutionConfig,
) -> Arc<AgentExecutor> {
    Arc::new(AgentExecutor::new(factory, tools, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_sequence() {
        let client = MockLLMClient::sequence(vec![
            LLMResponse::with_tool_calls(vec![tool_call("c1", "web_search", Value::Null)]),
            LLMResponse::text("done"),
        ]);

        let first = client
            .generate_with_tools_and_history(
                &[ConversationMessage::user("hi")],
                &[],
                &RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(first.tool_calls.len(), 1);

        let second = client
            .generate_with_tools_and_history(
                &[
                    ConversationMessage::user("hi"),
                    ConversationMessage::assistant("", first.tool_calls),
                ],
                &[],
                &RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(second.content, "done");
    }

    #[tokio::test]
    async fn test_mock_factory_unknown_agent() {
        let factory = MockLLMFactory::new();
        let descriptor = AgentDescriptor::builder("Nobody").build();
        assert!(matches!(
            factory.create_client(&descriptor).await,
            Err(AppError::Configuration(_))
        ));
    }
}
