//! # agentry - multi-agent delegation runtime
//!
//! Runs language-model agents that call tools, hand requests off to one
//! another and cooperate on research.
//!
//! ## Overview
//!
//! - **Agent execution** - [`AgentExecutor`] runs one [`AgentDescriptor`]
//!   against one task, returning free text or schema-validated data, with
//!   tool failures turned into text the model can reason about.
//! - **Triage** - [`HandoffCoordinator`] lets a triage agent transfer a
//!   request to exactly one specialist, dropping tool traffic from the
//!   history that crosses over.
//! - **Research** - [`ResearchPipeline`] plans web searches, runs them
//!   concurrently, and writes a structured [`Report`] from whatever succeeded.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use agentry::{AgentryConfig, AppState, ResearchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> agentry::Result<()> {
//!     let config = AgentryConfig::load_or_default("agentry.toml")?;
//!     let state = AppState::from_config(config);
//!
//!     let pipeline = ResearchPipeline::new(state.executor.clone(), state.config.research.clone());
//!     let report = pipeline.run("renewable energy trends").await?;
//!     println!("{}", report.short_summary);
//!     Ok(())
//! }
//! ```
//!
//! ### Running a single agent
//!
//! ```rust,ignore
//! use agentry::agents::catalog;
//!
//! let result = state.executor.execute(&catalog::weather_agent(), "Weather in Oslo?").await?;
//! println!("{}", result.transcript("Weather in Oslo?"));
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Descriptors, the executor, triage handoffs, built-in agents
//! - [`llm`] - LLM client trait and the OpenAI/Azure client
//! - [`research`] - The plan/search/write pipeline
//! - [`tools`] - Tool definitions and registry
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![warn(rustdoc::missing_crate_level_docs)]

/// Agent descriptors, execution and handoffs.
pub mod agents;
/// Command line parsing and terminal output.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Multi-agent research pipeline.
pub mod research;
/// Built-in tools (web search, weather, writers).
pub mod tools;
/// Core types (conversation turns, results, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{AgentDescriptor, AgentExecutor, HandoffCoordinator, ToolRef};
pub use llm::client::LLMClientFactoryTrait;
pub use llm::{ConfigBasedLLMFactory, LLMClient, LLMResponse, Provider, ProviderRegistry};
pub use research::{ProgressEvent, Report, ResearchPipeline, SearchPlan};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, ExecutionError, ExecutionErrorKind, ExecutionResult, Result};
pub use utils::toml_config::AgentryConfig;

use std::sync::Arc;

/// Everything a front end needs to run agents
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AgentryConfig>,
    /// Client factory shared by the executor and the writer tools
    pub llm_factory: Arc<dyn LLMClientFactoryTrait>,
    /// Tool registry for agent tools
    pub tool_registry: Arc<ToolRegistry>,
    /// The agent execution adapter
    pub executor: Arc<AgentExecutor>,
}

impl AppState {
    /// Wire up the config-driven factory and the default tools
    pub fn from_config(config: AgentryConfig) -> Self {
        let factory: Arc<dyn LLMClientFactoryTrait> =
            Arc::new(ConfigBasedLLMFactory::from_config(&config));
        Self::with_factory(config, factory)
    }

    /// Same as [`from_config`](Self::from_config) with a custom client factory
    pub fn with_factory(config: AgentryConfig, factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        let tool_registry = Arc::new(ToolRegistry::with_default_tools(&config, factory.clone()));
        let executor = Arc::new(AgentExecutor::new(
            factory.clone(),
            tool_registry.clone(),
            config.execution.clone(),
        ));
        Self {
            config: Arc::new(config),
            llm_factory: factory,
            tool_registry,
            executor,
        }
    }

    /// Triage coordinator over the shared executor
    pub fn handoff(&self) -> HandoffCoordinator {
        HandoffCoordinator::new(self.executor.clone())
    }

    /// Research pipeline using the configured limits
    pub fn research(&self) -> ResearchPipeline {
        ResearchPipeline::new(self.executor.clone(), self.config.research.clone())
    }
}
