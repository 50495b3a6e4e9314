use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Tool Types =============

/// A tool as advertised to the model.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Conversation Types =============

/// Role of a turn in an agent conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions.
    System,
    /// User message.
    User,
    /// Assistant response, possibly carrying tool calls.
    Assistant,
    /// Tool execution result.
    Tool,
}

impl MessageRole {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// One turn of a conversation, including tool invocations and their results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The text content of the message.
    pub content: String,
    /// Tool calls requested by the assistant (only for Assistant role).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Id of the call this message answers (only for Tool role).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ConversationMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message with optional tool calls.
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, result: &serde_json::Value) -> Self {
        let content = match result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            role: MessageRole::Tool,
            content,
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// True for tool invocations (assistant turns carrying tool calls) and tool results.
    pub fn is_tool_turn(&self) -> bool {
        self.role == MessageRole::Tool || !self.tool_calls.is_empty()
    }
}

// ============= Execution Types =============

/// Category of an agent invocation failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionErrorKind {
    /// Required settings or credentials are missing.
    Configuration,
    /// The model endpoint rejected the credentials.
    Authentication,
    /// The request never completed (connection, DNS, IO).
    Transport,
    /// The model endpoint answered with an error or an unusable body.
    Model,
    /// The invocation exceeded its time budget.
    Timeout,
    /// The tool-calling loop did not converge.
    IterationLimit,
    /// The agent asked to hand off where no handoff is possible.
    Delegation,
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionErrorKind::Configuration => "configuration",
            ExecutionErrorKind::Authentication => "authentication",
            ExecutionErrorKind::Transport => "transport",
            ExecutionErrorKind::Model => "model",
            ExecutionErrorKind::Timeout => "timeout",
            ExecutionErrorKind::IterationLimit => "iteration_limit",
            ExecutionErrorKind::Delegation => "delegation",
        };
        f.write_str(name)
    }
}

/// A normalized agent invocation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub message: String,
}

impl ExecutionError {
    pub fn new(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Header line of a rendered text-mode transcript.
pub const TRANSCRIPT_HEADER: &str = "Agent execution completed!";

/// Outcome of running one agent against one task.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Free-text final output.
    Text(String),
    /// Final output validated against the descriptor's output schema.
    Structured(serde_json::Value),
    /// The invocation failed; only produced in text mode.
    Failed(ExecutionError),
}

impl ExecutionResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionResult::Failed(_))
    }

    /// Text output, if this is a `Text` result.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExecutionResult::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Collapse into a displayable string; failures become their error text.
    pub fn into_text(self) -> String {
        match self {
            ExecutionResult::Text(text) => text,
            ExecutionResult::Structured(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
            ExecutionResult::Failed(err) => format!("Error: {}", err.message),
        }
    }

    /// Render the human-facing block shown after a text-mode run.
    pub fn transcript(&self, task: &str) -> String {
        match self {
            ExecutionResult::Failed(err) => format!("Error: {}", err.message),
            other => format!(
                "{}\n\nTask: {}\nResponse: {}",
                TRANSCRIPT_HEADER,
                task,
                other.clone().into_text()
            ),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Schema validation error: {0}")]
    SchemaValidation(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for an [`AppError::Execution`] of the given kind.
    pub fn execution(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        AppError::Execution(ExecutionError::new(kind, message))
    }

    /// Normalize any error into the `Failed` payload of a text-mode result.
    pub fn into_execution_error(self) -> ExecutionError {
        match self {
            AppError::Execution(err) => err,
            AppError::Configuration(msg) => {
                ExecutionError::new(ExecutionErrorKind::Configuration, msg)
            }
            other => ExecutionError::new(ExecutionErrorKind::Model, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
