//! Immutable agent configuration.
//!
//! An [`AgentDescriptor`] is a cheap value object: name, instructions, the
//! tools it may call, the agents it may hand off to and, optionally, the type
//! its final answer must deserialize into. Callers build a fresh one per
//! invocation; nothing in it changes once built.

use crate::types::{AppError, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Prefix of the synthetic tools offered for delegation.
pub const TRANSFER_TOOL_PREFIX: &str = "transfer_to_";

/// A capability an agent may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolRef {
    WebSearch,
    Weather,
    WriteDocumentation,
    WriteCode,
}

impl ToolRef {
    pub const ALL: [ToolRef; 4] = [
        ToolRef::WebSearch,
        ToolRef::Weather,
        ToolRef::WriteDocumentation,
        ToolRef::WriteCode,
    ];

    /// Name of the registered tool backing this capability
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolRef::WebSearch => "web_search",
            ToolRef::Weather => "get_weather",
            ToolRef::WriteDocumentation => "write_documentation",
            ToolRef::WriteCode => "write_code",
        }
    }
}

impl fmt::Display for ToolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

impl FromStr for ToolRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ToolRef::ALL
            .into_iter()
            .find(|tool| tool.tool_name() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown capability: {}", s)))
    }
}

/// JSON schema plus the typed validator for a structured output.
#[derive(Clone)]
pub struct OutputSchema {
    name: String,
    schema: Value,
    validator: fn(&Value) -> std::result::Result<(), String>,
}

fn validate_as<T: DeserializeOwned>(value: &Value) -> std::result::Result<(), String> {
    T::deserialize(value).map(|_| ()).map_err(|e| e.to_string())
}

impl OutputSchema {
    /// Schema derived from `T`; validation means "deserializes into `T`".
    pub fn of<T: JsonSchema + DeserializeOwned>() -> Self {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
        Self {
            name: T::schema_name().into_owned(),
            schema,
            validator: validate_as::<T>,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check a candidate output, failing with [`AppError::SchemaValidation`]
    pub fn validate(&self, value: &Value) -> Result<()> {
        (self.validator)(value).map_err(|e| {
            AppError::SchemaValidation(format!("output does not match {}: {}", self.name, e))
        })
    }
}

impl fmt::Debug for OutputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable description of one agent.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    name: String,
    instructions: String,
    handoff_description: Option<String>,
    capabilities: BTreeSet<ToolRef>,
    delegation_targets: Vec<AgentDescriptor>,
    output_schema: Option<OutputSchema>,
    execution_hints: HashMap<String, Value>,
}

impl AgentDescriptor {
    pub fn builder(name: impl Into<String>) -> AgentDescriptorBuilder {
        AgentDescriptorBuilder {
            inner: AgentDescriptor {
                name: name.into(),
                instructions: String::new(),
                handoff_description: None,
                capabilities: BTreeSet::new(),
                delegation_targets: Vec::new(),
                output_schema: None,
                execution_hints: HashMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Short description shown to a triage agent deciding whether to hand off here
    pub fn handoff_description(&self) -> Option<&str> {
        self.handoff_description.as_deref()
    }

    pub fn capabilities(&self) -> &BTreeSet<ToolRef> {
        &self.capabilities
    }

    pub fn has_capability(&self, tool_name: &str) -> bool {
        self.capabilities.iter().any(|c| c.tool_name() == tool_name)
    }

    pub fn delegation_targets(&self) -> &[AgentDescriptor] {
        &self.delegation_targets
    }

    pub fn output_schema(&self) -> Option<&OutputSchema> {
        self.output_schema.as_ref()
    }

    pub fn execution_hints(&self) -> &HashMap<String, Value> {
        &self.execution_hints
    }

    pub fn hint(&self, key: &str) -> Option<&Value> {
        self.execution_hints.get(key)
    }

    pub fn hint_str(&self, key: &str) -> Option<&str> {
        self.hint(key).and_then(Value::as_str)
    }

    /// Name of the tool other agents call to hand off to this one
    pub fn transfer_tool_name(&self) -> String {
        let snake: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", TRANSFER_TOOL_PREFIX, snake)
    }

    /// Delegation target reached through the given transfer tool
    pub fn target_for_tool(&self, tool_name: &str) -> Option<&AgentDescriptor> {
        self.delegation_targets
            .iter()
            .find(|target| target.transfer_tool_name() == tool_name)
    }

    /// Copy of this descriptor that cannot delegate any further
    pub fn without_delegation(&self) -> AgentDescriptor {
        AgentDescriptor {
            delegation_targets: Vec::new(),
            ..self.clone()
        }
    }
}

/// Builder for [`AgentDescriptor`].
#[derive(Debug)]
pub struct AgentDescriptorBuilder {
    inner: AgentDescriptor,
}

impl AgentDescriptorBuilder {
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.inner.instructions = instructions.into();
        self
    }

    pub fn handoff_description(mut self, description: impl Into<String>) -> Self {
        self.inner.handoff_description = Some(description.into());
        self
    }

    pub fn capability(mut self, tool: ToolRef) -> Self {
        self.inner.capabilities.insert(tool);
        self
    }

    pub fn delegate_to(mut self, target: AgentDescriptor) -> Self {
        self.inner.delegation_targets.push(target);
        self
    }

    pub fn output_schema(mut self, schema: OutputSchema) -> Self {
        self.inner.output_schema = Some(schema);
        self
    }

    /// Require the final answer to deserialize into `T`
    pub fn output_type<T: JsonSchema + DeserializeOwned>(self) -> Self {
        self.output_schema(OutputSchema::of::<T>())
    }

    pub fn hint(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner.execution_hints.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> AgentDescriptor {
        self.inner
    }
}
