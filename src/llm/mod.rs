//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for talking to chat-completion
//! providers. Provider-specific wire details stay behind the [`LLMClient`]
//! trait so the agent runtime works with any supported endpoint.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`LLMClientFactoryTrait`] - Builds a fresh client for each agent invocation
//! - [`ProviderRegistry`] - Resolves model aliases into credentialed providers
//! - [`ConfigBasedLLMFactory`] - Creates clients based on `agentry.toml`
//!
//! # Supported Providers
//!
//! - OpenAI API and compatible endpoints
//! - Azure OpenAI deployments
//!
//! # Example
//!
//! ```ignore
//! use agentry::llm::{ConfigBasedLLMFactory, LLMClientFactoryTrait};
//!
//! let factory = ConfigBasedLLMFactory::from_config(&config);
//! let client = factory.create_client(&descriptor).await?;
//! let answer = client.generate_with_system("Be brief.", "What is 2+2?").await?;
//! ```

/// Core LLM client trait and request/response types.
pub mod client;
/// OpenAI-compatible chat-completions client.
pub mod openai;
/// Model alias resolution and the config-driven client factory.
pub mod provider_registry;

pub use client::{
    LLMClient, LLMClientFactoryTrait, LLMResponse, Provider, RequestOptions, ResponseFormat,
    TokenUsage, ToolChoice,
};
pub use openai::OpenAIClient;
pub use provider_registry::{ConfigBasedLLMFactory, EnvLookup, ProviderRegistry};
