use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One web search the planner wants performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchItem {
    /// Your reasoning for why this search is important to the query.
    pub reason: String,
    /// The search term to use for the web search.
    pub query: String,
}

impl SearchItem {
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            query: query.into(),
        }
    }

    /// Task text handed to the search agent.
    pub fn task(&self) -> String {
        format!(
            "Search term: {}\nReason for searching: {}",
            self.query, self.reason
        )
    }
}

/// Output of the planning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchPlan {
    /// A list of web searches to perform to best answer the query.
    pub searches: Vec<SearchItem>,
}

impl SearchPlan {
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }
}

/// Summary of one search, or `None` when that search failed.
pub type SearchOutcome = Option<String>;

/// Final artifact of a research run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// A short 2-3 sentence summary of the findings.
    pub short_summary: String,
    /// The full report in Markdown.
    pub markdown_body: String,
    /// Suggested topics to research further.
    pub follow_up_questions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Planning,
    Searching,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Planning => write!(f, "planning"),
            Stage::Searching => write!(f, "searching"),
            Stage::Writing => write!(f, "writing"),
        }
    }
}

/// Pipeline progress: `completed` of `total` units done in `stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub completed: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn new(stage: Stage, completed: usize, total: usize) -> Self {
        Self {
            stage,
            completed,
            total,
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}
