//! Built-in Tools for Agent Capabilities
//!
//! Tools let agents act beyond text generation. Each capability an
//! [`AgentDescriptor`](crate::agents::AgentDescriptor) declares maps to one
//! registered tool.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - Tool trait, registration and execution
//! - [`search`](crate::tools::search) - `web_search` via DuckDuckGo
//! - [`weather`](crate::tools::weather) - `get_weather` via OpenWeather
//! - [`writing`](crate::tools::writing) - `write_documentation` and `write_code`
//!
//! # Tool Registry
//!
//! ```ignore
//! let registry = ToolRegistry::with_default_tools(&config, factory);
//! let result = registry.execute("get_weather", json!({"city": "Oslo"})).await?;
//! ```
//!
//! Tool failures are returned as errors here; the agent executor turns them
//! into error text for the model instead of failing the run.

/// Tool registry for managing available tools.
pub mod registry;
/// Web search tool using DuckDuckGo.
pub mod search;
/// Current weather lookup.
pub mod weather;
/// Documentation and code generation tools.
pub mod writing;

pub use registry::{Tool, ToolRegistry};
