//! The built-in agents.
//!
//! Each function returns a freshly built descriptor, so concurrent callers
//! never share one.

use crate::agents::descriptor::{AgentDescriptor, ToolRef};
use crate::agents::prompts;
use crate::research::{Report, SearchPlan};

pub const WEATHER_AGENT: &str = "Weather-Agent";
pub const DOCUMENTATION_AGENT: &str = "Documentation-Agent";
pub const CODING_AGENT: &str = "Coding-Agent";
pub const TRIAGE_AGENT: &str = "Triage-Agent";
pub const PLANNER_AGENT: &str = "PlannerAgent";
pub const SEARCH_AGENT: &str = "Search agent";
pub const WRITER_AGENT: &str = "WriterAgent";

/// Model alias used by the coding agent and the code writer tool.
pub const CODING_MODEL: &str = "coding";

pub fn weather_agent() -> AgentDescriptor {
    AgentDescriptor::builder(WEATHER_AGENT)
        .instructions(prompts::WEATHER_INSTRUCTIONS)
        .capability(ToolRef::Weather)
        .build()
}

pub fn documentation_agent() -> AgentDescriptor {
    AgentDescriptor::builder(DOCUMENTATION_AGENT)
        .instructions(prompts::DOCUMENTATION_INSTRUCTIONS)
        .handoff_description(prompts::DOCUMENTATION_HANDOFF)
        .capability(ToolRef::WriteDocumentation)
        .build()
}

pub fn coding_agent() -> AgentDescriptor {
    AgentDescriptor::builder(CODING_AGENT)
        .instructions(prompts::CODING_INSTRUCTIONS)
        .handoff_description(prompts::CODING_HANDOFF)
        .capability(ToolRef::WriteCode)
        .hint("model", CODING_MODEL)
        .build()
}

/// Triage agent delegating to the documentation and coding agents.
pub fn triage_agent() -> AgentDescriptor {
    AgentDescriptor::builder(TRIAGE_AGENT)
        .instructions(prompts::TRIAGE_INSTRUCTIONS)
        .delegate_to(documentation_agent())
        .delegate_to(coding_agent())
        .build()
}

pub fn planner_agent() -> AgentDescriptor {
    AgentDescriptor::builder(PLANNER_AGENT)
        .instructions(prompts::PLANNER_INSTRUCTIONS)
        .output_type::<SearchPlan>()
        .build()
}

pub fn search_agent() -> AgentDescriptor {
    AgentDescriptor::builder(SEARCH_AGENT)
        .instructions(prompts::SEARCH_INSTRUCTIONS)
        .capability(ToolRef::WebSearch)
        .hint("tool_choice", "required")
        .build()
}

pub fn writer_agent() -> AgentDescriptor {
    AgentDescriptor::builder(WRITER_AGENT)
        .instructions(prompts::WRITER_INSTRUCTIONS)
        .output_type::<Report>()
        .build()
}
