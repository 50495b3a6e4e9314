//! Agent Execution Adapter
//!
//! [`AgentExecutor`] runs one [`AgentDescriptor`] against one task and folds
//! everything that can happen along the way into a uniform contract:
//!
//! 1. Build a fresh model client for the descriptor
//! 2. Send instructions, history and the allowed tools
//! 3. Execute requested tools, feeding results (or error text) back
//! 4. Repeat until the model answers, hands off, or the iteration limit hits
//!
//! In text mode every failure comes back as [`ExecutionResult::Failed`]. In
//! structured mode failures are returned as errors, because a structured
//! caller has no use for degraded output.

use crate::agents::descriptor::{AgentDescriptor, OutputSchema, ToolRef};
use crate::llm::client::{
    LLMClientFactoryTrait, RequestOptions, ResponseFormat, TokenUsage, ToolChoice,
};
use crate::tools::registry::ToolRegistry;
use crate::types::{
    AppError, ConversationMessage, ExecutionErrorKind, ExecutionResult, Result, ToolCall,
    ToolDefinition,
};
use crate::utils::toml_config::ExecutionConfig;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

/// Record of a single tool call execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Unique identifier for this tool call (from the LLM).
    pub id: String,
    /// Name of the tool that was called.
    pub name: String,
    /// Arguments passed to the tool.
    pub arguments: Value,
    /// Result returned by the tool (or error object).
    pub result: Value,
    /// Whether the tool execution was successful.
    pub success: bool,
    /// Time taken to execute the tool in milliseconds.
    pub duration_ms: u64,
    /// Error message if the tool failed.
    pub error: Option<String>,
}

impl ToolCallRecord {
    fn failed(call: &ToolCall, message: String, duration_ms: u64) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result: json!({ "error": message }),
            success: false,
            duration_ms,
            error: Some(message),
        }
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The model produced its final answer.
    Output(String),
    /// The model asked to hand off to the named delegation target.
    Delegate(String),
}

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub completion: Completion,
    /// Conversation after the run, without the system instructions.
    pub history: Vec<ConversationMessage>,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model round-trips.
    pub iterations: usize,
    pub usage: TokenUsage,
}

/// Runs agents. Cheap to share behind an `Arc`; holds no per-run state.
pub struct AgentExecutor {
    factory: Arc<dyn LLMClientFactoryTrait>,
    tools: Arc<ToolRegistry>,
    config: ExecutionConfig,
}

impl AgentExecutor {
    pub fn new(
        factory: Arc<dyn LLMClientFactoryTrait>,
        tools: Arc<ToolRegistry>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            factory,
            tools,
            config,
        }
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run `descriptor` against `task`.
    ///
    /// Without an output schema this always returns `Ok` (`Text` or `Failed`).
    /// With one it returns `Ok(Structured)` or an error; a schema mismatch is
    /// [`AppError::SchemaValidation`].
    pub async fn execute(&self, descriptor: &AgentDescriptor, task: &str) -> Result<ExecutionResult> {
        let outcome = self
            .invoke(descriptor, vec![ConversationMessage::user(task)])
            .await;
        self.conclude(descriptor, outcome)
    }

    /// Run a structured descriptor and deserialize its output into `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        descriptor: &AgentDescriptor,
        task: &str,
    ) -> Result<T> {
        if descriptor.output_schema().is_none() {
            return Err(AppError::InvalidInput(format!(
                "{} has no output schema",
                descriptor.name()
            )));
        }
        match self.execute(descriptor, task).await? {
            ExecutionResult::Structured(value) => serde_json::from_value(value)
                .map_err(|e| AppError::SchemaValidation(e.to_string())),
            other => Err(AppError::Internal(format!(
                "structured run of {} returned {:?}",
                descriptor.name(),
                other
            ))),
        }
    }

    /// Turn a raw invocation outcome into the caller-facing result.
    pub fn conclude(
        &self,
        descriptor: &AgentDescriptor,
        outcome: Result<Invocation>,
    ) -> Result<ExecutionResult> {
        let text = outcome.and_then(|invocation| match invocation.completion {
            Completion::Output(text) => Ok(text),
            Completion::Delegate(target) => Err(AppError::execution(
                ExecutionErrorKind::Delegation,
                format!(
                    "{} asked to hand off to {}; delegating agents must be routed",
                    descriptor.name(),
                    target
                ),
            )),
        });

        match (descriptor.output_schema(), text) {
            (None, Ok(text)) => Ok(ExecutionResult::Text(text)),
            (None, Err(e)) => {
                warn!(agent = %descriptor.name(), error = %e, "Agent invocation failed");
                Ok(ExecutionResult::Failed(e.into_execution_error()))
            }
            (Some(schema), Ok(text)) => {
                parse_structured(schema, &text).map(ExecutionResult::Structured)
            }
            (Some(_), Err(e)) => Err(e),
        }
    }

    /// Run the tool-calling loop over an explicit history.
    ///
    /// A delegation request ends the run with [`Completion::Delegate`]; the
    /// caller decides what to do with it.
    pub async fn invoke(
        &self,
        descriptor: &AgentDescriptor,
        history: Vec<ConversationMessage>,
    ) -> Result<Invocation> {
        let run_id = Uuid::new_v4();
        let span = info_span!("agent", agent = %descriptor.name(), run_id = %run_id);
        let run = self.run_loop(descriptor, history).instrument(span);

        match self.config.invocation_timeout() {
            Some(limit) => timeout(limit, run).await.map_err(|_| {
                AppError::execution(
                    ExecutionErrorKind::Timeout,
                    format!("{} did not finish within {:?}", descriptor.name(), limit),
                )
            })?,
            None => run.await,
        }
    }

    fn tool_definitions(&self, descriptor: &AgentDescriptor) -> Result<Vec<ToolDefinition>> {
        let names: Vec<&str> = descriptor
            .capabilities()
            .iter()
            .map(ToolRef::tool_name)
            .collect();

        if let Some(missing) = names.iter().find(|name| !self.tools.has_tool(name)) {
            return Err(AppError::Configuration(format!(
                "{} requires tool '{}' which is not registered",
                descriptor.name(),
                missing
            )));
        }

        let mut definitions = self.tools.get_tool_definitions_for(&names);
        definitions.extend(descriptor.delegation_targets().iter().map(transfer_definition));
        Ok(definitions)
    }

    async fn run_loop(
        &self,
        descriptor: &AgentDescriptor,
        history: Vec<ConversationMessage>,
    ) -> Result<Invocation> {
        let definitions = self.tool_definitions(descriptor)?;
        let client = self.factory.create_client(descriptor).await?;
        debug!(model = client.model_name(), tools = definitions.len(), "Starting agent run");

        let mut messages = Vec::with_capacity(history.len() + 1);
        let offset = if descriptor.instructions().is_empty() {
            0
        } else {
            messages.push(ConversationMessage::system(descriptor.instructions()));
            1
        };
        messages.extend(history);

        let base_options = RequestOptions {
            tool_choice: ToolChoice::Auto,
            response_format: descriptor.output_schema().map(|schema| ResponseFormat {
                name: schema.name().to_string(),
                schema: schema.schema().clone(),
            }),
            temperature: descriptor
                .hint("temperature")
                .and_then(Value::as_f64)
                .map(|t| t as f32),
        };
        let force_tool =
            descriptor.hint_str("tool_choice") == Some("required") && !definitions.is_empty();

        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut usage = TokenUsage::default();

        for iteration in 0..self.config.max_tool_iterations {
            // Forcing only the first turn lets the agent finish afterwards.
            let options = RequestOptions {
                tool_choice: if iteration == 0 && force_tool {
                    ToolChoice::Required
                } else {
                    ToolChoice::Auto
                },
                ..base_options.clone()
            };

            let response = client
                .generate_with_tools_and_history(&messages, &definitions, &options)
                .await?;

            if let Some(turn) = &response.usage {
                usage = TokenUsage::new(
                    usage.prompt_tokens + turn.prompt_tokens,
                    usage.completion_tokens + turn.completion_tokens,
                );
            }

            messages.push(ConversationMessage::assistant(
                &response.content,
                response.tool_calls.clone(),
            ));

            if response.tool_calls.is_empty() {
                return Ok(Invocation {
                    completion: Completion::Output(response.content),
                    history: messages.split_off(offset),
                    tool_calls: records,
                    iterations: iteration + 1,
                    usage,
                });
            }

            let transfer = response
                .tool_calls
                .iter()
                .find_map(|call| descriptor.target_for_tool(&call.name).map(|t| (call, t)));

            if let Some((chosen, target)) = transfer {
                let requested = response
                    .tool_calls
                    .iter()
                    .filter(|call| descriptor.target_for_tool(&call.name).is_some())
                    .count();
                if requested > 1 {
                    warn!(count = requested, taken = %target.name(), "Multiple handoffs requested, using the first");
                }
                for call in &response.tool_calls {
                    let result = if call.id == chosen.id {
                        json!(format!("Transferred to {}", target.name()))
                    } else {
                        json!({ "error": "Not executed: conversation handed off" })
                    };
                    messages.push(ConversationMessage::tool_result(&call.id, &result));
                }
                return Ok(Invocation {
                    completion: Completion::Delegate(target.name().to_string()),
                    history: messages.split_off(offset),
                    tool_calls: records,
                    iterations: iteration + 1,
                    usage,
                });
            }

            let results = join_all(
                response
                    .tool_calls
                    .iter()
                    .map(|call| self.execute_single_tool(descriptor, call)),
            )
            .await;

            for record in results {
                messages.push(ConversationMessage::tool_result(&record.id, &record.result));
                records.push(record);
            }
        }

        Err(AppError::execution(
            ExecutionErrorKind::IterationLimit,
            format!(
                "{} made no final answer within {} model turns",
                descriptor.name(),
                self.config.max_tool_iterations
            ),
        ))
    }

    /// Execute a single tool call with timeout. Never fails: errors become the result.
    async fn execute_single_tool(
        &self,
        descriptor: &AgentDescriptor,
        call: &ToolCall,
    ) -> ToolCallRecord {
        debug!(tool = %call.name, "Executing tool call");

        if !descriptor.has_capability(&call.name) {
            warn!(tool = %call.name, "Model called a tool outside its capabilities");
            return ToolCallRecord::failed(
                call,
                format!("Tool '{}' is not available to this agent", call.name),
                0,
            );
        }

        let start = Instant::now();
        let result = timeout(
            self.config.tool_timeout(),
            self.tools.execute(&call.name, call.arguments.clone()),
        )
        .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(value)) => ToolCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                result: value,
                success: true,
                duration_ms,
                error: None,
            },
            Ok(Err(e)) => {
                warn!(tool = %call.name, error = %e, "Tool failed");
                ToolCallRecord::failed(call, e.to_string(), duration_ms)
            }
            Err(_) => {
                warn!(tool = %call.name, "Tool timed out");
                ToolCallRecord::failed(call, "Tool execution timed out".to_string(), duration_ms)
            }
        }
    }
}

fn transfer_definition(target: &AgentDescriptor) -> ToolDefinition {
    let description = match target.handoff_description() {
        Some(text) => format!("Handoff to the {} agent. {}", target.name(), text),
        None => format!("Handoff to the {} agent to handle the request.", target.name()),
    };
    ToolDefinition {
        name: target.transfer_tool_name(),
        description,
        parameters: json!({ "type": "object", "properties": {}, "additionalProperties": false }),
    }
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

fn parse_structured(schema: &OutputSchema, text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        AppError::SchemaValidation(format!("{} output is not valid JSON: {}", schema.name(), e))
    })?;
    schema.validate(&value)?;
    Ok(value)
}
