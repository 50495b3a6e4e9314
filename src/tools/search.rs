//! `web_search` capability backed by daedra (DuckDuckGo).

use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

const DEFAULT_RESULTS: usize = 8;
const MAX_RESULTS: usize = 20;

#[derive(Debug, Serialize)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// Web search tool powered by daedra
pub struct SearchTool;

impl SearchTool {
    pub fn new() -> Self {
        Self
    }

    fn parse_args(args: &Value) -> Result<(String, usize)> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::Tool("web_search needs a non-empty 'query'".to_string()))?;

        let num_results = args
            .get("num_results")
            .and_then(Value::as_u64)
            .map(|n| (n as usize).clamp(1, MAX_RESULTS))
            .unwrap_or(DEFAULT_RESULTS);

        Ok((query.to_string(), num_results))
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web and return titles, links and snippets for the best matches"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search term"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 8)",
                    "minimum": 1,
                    "maximum": MAX_RESULTS
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, num_results) = Self::parse_args(&args)?;

        let search_args = daedra::SearchArgs {
            query: query.clone(),
            options: Some(daedra::SearchOptions {
                num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Tool(format!("Search for '{}' failed: {}", query, e)))?;

        let hits: Vec<SearchHit> = response
            .data
            .iter()
            .map(|r| SearchHit {
                title: r.title.clone(),
                url: r.url.clone(),
                snippet: r.description.clone(),
            })
            .collect();

        Ok(json!({
            "query": query,
            "count": hits.len(),
            "results": hits,
        }))
    }
}
