//! `write_documentation` and `write_code`: nested single-shot generations.
//!
//! Each call builds its own descriptor (instructions depend on the arguments)
//! and asks the factory for a fresh client, so concurrent calls share nothing.

use crate::agents::catalog::{CODING_AGENT, CODING_MODEL, DOCUMENTATION_AGENT};
use crate::agents::AgentDescriptor;
use crate::llm::LLMClientFactoryTrait;
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const DOC_TYPES: [&str; 6] = ["api", "tutorial", "guide", "readme", "technical", "user"];
const DOC_FORMATS: [&str; 4] = ["markdown", "rst", "html", "plain"];
const DETAIL_LEVELS: [&str; 3] = ["brief", "detailed", "comprehensive"];
const CODE_STYLES: [&str; 5] = ["function", "class", "module", "script", "snippet"];

fn parse<T: for<'de> Deserialize<'de>>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| AppError::Tool(format!("invalid arguments for {}: {}", tool, e)))
}

fn one_of(tool: &str, field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Tool(format!(
            "{}: '{}' must be one of {}, got '{}'",
            tool,
            field,
            allowed.join(", "),
            value
        )))
    }
}

async fn generate(
    factory: &Arc<dyn LLMClientFactoryTrait>,
    descriptor: &AgentDescriptor,
    task: &str,
) -> Result<String> {
    let client = factory.create_client(descriptor).await?;
    client
        .generate_with_system(descriptor.instructions(), task)
        .await
        .map_err(|e| AppError::Tool(format!("{} failed: {}", descriptor.name(), e)))
}

// ============= Documentation =============

fn default_format() -> String {
    "markdown".to_string()
}

fn default_detail() -> String {
    "detailed".to_string()
}

#[derive(Debug, Deserialize)]
struct DocRequest {
    topic: String,
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(default = "default_format")]
    format: String,
    #[serde(default = "default_detail")]
    detail_level: String,
}

impl DocRequest {
    fn instructions(&self) -> String {
        let mut lines = vec![
            format!(
                "You are a technical writer producing {} {} documentation in {} format.",
                self.detail_level, self.doc_type, self.format
            ),
            "Use clear headings, include examples where they help, and write for the \
             audience this kind of document serves."
                .to_string(),
        ];
        if self.format == "markdown" {
            lines.push("Use Markdown headers, code blocks, lists and links.".to_string());
        }
        match self.doc_type.as_str() {
            "api" => lines.push(
                "Cover every parameter, show request and response examples, list error codes."
                    .to_string(),
            ),
            "tutorial" => lines.push("Walk through the steps in order with examples.".to_string()),
            "guide" => lines.push("Organize content into sections and subsections.".to_string()),
            _ => {}
        }
        lines.join("\n")
    }
}

/// Generates documentation with a nested writer.
pub struct DocumentationTool {
    factory: Arc<dyn LLMClientFactoryTrait>,
}

impl DocumentationTool {
    pub fn new(factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl Tool for DocumentationTool {
    fn name(&self) -> &str {
        "write_documentation"
    }

    fn description(&self) -> &str {
        "Generate technical documentation (API docs, tutorials, guides, READMEs)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string", "description": "The topic or subject to document" },
                "type": { "type": "string", "enum": DOC_TYPES, "description": "Type of documentation to generate" },
                "format": { "type": "string", "enum": DOC_FORMATS, "description": "Output format (default: markdown)" },
                "detail_level": { "type": "string", "enum": DETAIL_LEVELS, "description": "Level of detail (default: detailed)" }
            },
            "required": ["topic", "type"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let request: DocRequest = parse(self.name(), args)?;
        one_of(self.name(), "type", &request.doc_type, &DOC_TYPES)?;
        one_of(self.name(), "format", &request.format, &DOC_FORMATS)?;
        one_of(self.name(), "detail_level", &request.detail_level, &DETAIL_LEVELS)?;

        let writer = AgentDescriptor::builder(DOCUMENTATION_AGENT)
            .instructions(request.instructions())
            .build();
        let task = format!(
            "Create {} {} documentation for: {}",
            request.detail_level, request.doc_type, request.topic
        );
        let body = generate(&self.factory, &writer, &task).await?;

        Ok(json!(format!(
            "Generated {} documentation for \"{}\" ({} level, {} format):\n\n{}",
            request.doc_type, request.topic, request.detail_level, request.format, body
        )))
    }
}

// ============= Code =============

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct CodeRequest {
    task: String,
    language: String,
    style: String,
    #[serde(default)]
    framework: String,
    #[serde(default)]
    include_tests: bool,
    #[serde(default = "default_true")]
    include_comments: bool,
}

impl CodeRequest {
    fn framework(&self) -> Option<&str> {
        Some(self.framework.trim()).filter(|f| !f.is_empty())
    }

    fn instructions(&self) -> String {
        let mut lines = vec![
            format!(
                "You are a software engineer writing {} in {} style.",
                self.language, self.style
            ),
            format!("Follow {} conventions and handle errors properly.", self.language),
        ];
        if let Some(framework) = self.framework() {
            lines.push(format!("Use the {} framework.", framework));
        }
        lines.push(if self.include_comments {
            "Comment the non-obvious parts.".to_string()
        } else {
            "Keep comments to a minimum.".to_string()
        });
        lines.push(if self.include_tests {
            "Include unit tests.".to_string()
        } else {
            "Do not include tests.".to_string()
        });
        lines.push("Reply with the code and at most a short explanation.".to_string());
        lines.join("\n")
    }
}

/// Generates code with a nested writer on the coding model.
pub struct CodingTool {
    factory: Arc<dyn LLMClientFactoryTrait>,
}

impl CodingTool {
    pub fn new(factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl Tool for CodingTool {
    fn name(&self) -> &str {
        "write_code"
    }

    fn description(&self) -> &str {
        "Generate code in a given language and style"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task": { "type": "string", "description": "Description of the code to generate" },
                "language": { "type": "string", "description": "Programming language (e.g. rust, python, typescript)" },
                "style": { "type": "string", "enum": CODE_STYLES, "description": "Code structure to generate" },
                "framework": { "type": "string", "description": "Framework or library to use (empty if none)" },
                "include_tests": { "type": "boolean", "description": "Whether to include unit tests (default: false)" },
                "include_comments": { "type": "boolean", "description": "Whether to include comments (default: true)" }
            },
            "required": ["task", "language", "style"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let request: CodeRequest = parse(self.name(), args)?;
        one_of(self.name(), "style", &request.style, &CODE_STYLES)?;

        let writer = AgentDescriptor::builder(CODING_AGENT)
            .instructions(request.instructions())
            .hint("model", CODING_MODEL)
            .build();
        let task = format!("Task: {}", request.task);
        let code = generate(&self.factory, &writer, &task).await?;

        Ok(json!(format!(
            "Generated {} code ({} style) for \"{}\":\n\n{}",
            request.language, request.style, request.task, code
        )))
    }
}
