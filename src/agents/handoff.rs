//! Handoff Coordinator (triage).
//!
//! A triage agent either answers a request itself or transfers it to exactly
//! one of its delegation targets. The target sees only the natural-language
//! part of the conversation: tool invocations and tool results are filtered
//! out at the boundary.

use crate::agents::descriptor::AgentDescriptor;
use crate::agents::executor::{AgentExecutor, Completion};
use crate::types::{AppError, ConversationMessage, ExecutionResult, MessageRole, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Keep only the natural-language part of user and assistant turns.
///
/// Tool results and system turns are dropped. Assistant turns lose their tool
/// calls and survive only if they also carry text.
/// `filter_history(filter_history(h)) == filter_history(h)` and the output is
/// never longer than the input.
pub fn filter_history(history: &[ConversationMessage]) -> Vec<ConversationMessage> {
    history
        .iter()
        .filter_map(|msg| match msg.role {
            MessageRole::User => Some(msg.clone()),
            MessageRole::Assistant if !msg.content.trim().is_empty() => {
                Some(ConversationMessage::assistant(msg.content.clone(), Vec::new()))
            }
            _ => None,
        })
        .collect()
}

/// States a single request passes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffState {
    Idle,
    Triaging,
    Delegated(String),
    Direct,
    Completed,
}

impl fmt::Display for HandoffState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffState::Idle => write!(f, "idle"),
            HandoffState::Triaging => write!(f, "triaging"),
            HandoffState::Delegated(target) => write!(f, "delegated({})", target),
            HandoffState::Direct => write!(f, "direct"),
            HandoffState::Completed => write!(f, "completed"),
        }
    }
}

/// Which agent ended up answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Delegated { target: String },
    Direct,
}

/// What crossed the boundary during a delegation.
#[derive(Debug, Clone)]
pub struct HandoffRecord {
    pub source: String,
    pub target: String,
    pub filtered_history: Vec<ConversationMessage>,
    pub at: DateTime<Utc>,
}

/// Full account of one routed request.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub decision: Decision,
    pub result: ExecutionResult,
    pub record: Option<HandoffRecord>,
    pub transitions: Vec<HandoffState>,
}

pub struct HandoffCoordinator {
    executor: Arc<AgentExecutor>,
}

impl HandoffCoordinator {
    pub fn new(executor: Arc<AgentExecutor>) -> Self {
        Self { executor }
    }

    /// Route a request and return only the final result.
    pub async fn route(
        &self,
        triage: &AgentDescriptor,
        request: &str,
        history: &[ConversationMessage],
    ) -> Result<ExecutionResult> {
        Ok(self.route_detailed(triage, request, history).await?.result)
    }

    /// Route a request through `triage`, performing at most one handoff.
    ///
    /// For text-mode agents this never returns `Err`: a failed triage or
    /// target run comes back as `ExecutionResult::Failed` with a `Direct`
    /// decision (triage failed) or a `Delegated` one (target failed).
    pub async fn route_detailed(
        &self,
        triage: &AgentDescriptor,
        request: &str,
        history: &[ConversationMessage],
    ) -> Result<RouteOutcome> {
        let mut transitions = vec![HandoffState::Idle, HandoffState::Triaging];

        let mut conversation = history.to_vec();
        conversation.push(ConversationMessage::user(request));

        let triage_run = self.executor.invoke(triage, conversation).await;

        let invocation = match triage_run {
            Ok(invocation) => invocation,
            Err(e) => {
                transitions.push(HandoffState::Direct);
                let result = self.executor.conclude(triage, Err(e))?;
                transitions.push(HandoffState::Completed);
                return Ok(RouteOutcome {
                    decision: Decision::Direct,
                    result,
                    record: None,
                    transitions,
                });
            }
        };

        match invocation.completion {
            Completion::Delegate(target_name) => {
                let target = triage
                    .delegation_targets()
                    .iter()
                    .find(|t| t.name() == target_name)
                    .ok_or_else(|| {
                        AppError::Internal(format!("unknown delegation target {}", target_name))
                    })?
                    // No re-delegation chains.
                    .without_delegation();

                let filtered = filter_history(&invocation.history);
                info!(
                    source = %triage.name(),
                    target = %target.name(),
                    dropped = invocation.history.len() - filtered.len(),
                    "Handing off request"
                );
                transitions.push(HandoffState::Delegated(target_name.clone()));

                let record = HandoffRecord {
                    source: triage.name().to_string(),
                    target: target_name.clone(),
                    filtered_history: filtered.clone(),
                    at: Utc::now(),
                };

                let outcome = self.executor.invoke(&target, filtered).await;
                let result = self.executor.conclude(&target, outcome)?;
                transitions.push(HandoffState::Completed);

                Ok(RouteOutcome {
                    decision: Decision::Delegated {
                        target: target_name,
                    },
                    result,
                    record: Some(record),
                    transitions,
                })
            }
            Completion::Output(_) => {
                transitions.push(HandoffState::Direct);
                let result = self.executor.conclude(triage, Ok(invocation))?;
                transitions.push(HandoffState::Completed);
                Ok(RouteOutcome {
                    decision: Decision::Direct,
                    result,
                    record: None,
                    transitions,
                })
            }
        }
    }
}
