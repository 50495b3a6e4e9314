//! Agents: descriptors, the execution adapter, triage handoffs and the
//! built-in catalog.

/// Built-in agent descriptors.
pub mod catalog;
/// Immutable agent configuration.
pub mod descriptor;
/// Runs one agent against one task.
pub mod executor;
/// Triage routing with filtered handoffs.
pub mod handoff;
pub mod prompts;

pub use descriptor::{AgentDescriptor, AgentDescriptorBuilder, OutputSchema, ToolRef};
pub use executor::{AgentExecutor, Completion, Invocation, ToolCallRecord};
pub use handoff::{
    filter_history, Decision, HandoffCoordinator, HandoffRecord, HandoffState, RouteOutcome,
};
