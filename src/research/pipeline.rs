use crate::agents::catalog;
use crate::agents::AgentExecutor;
use crate::research::types::{ProgressEvent, Report, SearchOutcome, SearchPlan, Stage};
use crate::types::{AppError, ExecutionResult, Result, TRANSCRIPT_HEADER};
use crate::utils::toml_config::ResearchConfig;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Drop a rendered transcript wrapper, keeping only the response text.
pub fn strip_transcript_header(text: &str) -> &str {
    if !text.starts_with(TRANSCRIPT_HEADER) {
        return text;
    }
    match text.find("\nResponse: ") {
        Some(pos) => &text[pos + "\nResponse: ".len()..],
        None => text[TRANSCRIPT_HEADER.len()..].trim_start(),
    }
}

/// Plan, fan-out search, synthesize.
pub struct ResearchPipeline {
    executor: Arc<AgentExecutor>,
    config: ResearchConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl ResearchPipeline {
    /// A concurrency cap of zero is raised to one.
    pub fn new(executor: Arc<AgentExecutor>, mut config: ResearchConfig) -> Self {
        config.max_concurrent_searches = config.max_concurrent_searches.map(|limit| limit.max(1));
        Self {
            executor,
            config,
            progress: None,
        }
    }

    /// Emit progress events on `sender`. A dropped receiver is ignored.
    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    fn emit(&self, stage: Stage, completed: usize, total: usize) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(ProgressEvent::new(stage, completed, total));
        }
    }

    /// Run all three stages. Planning and writing failures abort the run;
    /// individual search failures do not.
    pub async fn run(&self, query: &str) -> Result<Report> {
        let plan = self.plan(query).await?;
        let outcomes = self.search(&plan).await;
        let summaries: Vec<String> = outcomes.into_iter().flatten().collect();
        self.write(query, &summaries).await
    }

    pub async fn plan(&self, query: &str) -> Result<SearchPlan> {
        info!("Planning searches...");
        self.emit(Stage::Planning, 0, 1);

        let planner = catalog::planner_agent();
        let plan: SearchPlan = self
            .executor
            .execute_as(&planner, &format!("Query: {}", query))
            .await?;

        let (min, max) = (self.config.min_searches, self.config.max_searches);
        if !(min..=max).contains(&plan.len()) {
            if self.config.enforce_plan_size {
                return Err(AppError::SchemaValidation(format!(
                    "plan has {} searches, expected between {} and {}",
                    plan.len(),
                    min,
                    max
                )));
            }
            warn!(count = plan.len(), min, max, "Plan size outside the requested range");
        }

        info!("Will perform {} searches", plan.len());
        self.emit(Stage::Planning, 1, 1);
        Ok(plan)
    }

    /// One concurrent search per plan item. The result has one slot per item,
    /// in plan order; failed items are `None`.
    pub async fn search(&self, plan: &SearchPlan) -> Vec<SearchOutcome> {
        let total = plan.len();
        info!("Searching...");
        self.emit(Stage::Searching, 0, total);

        let semaphore = self
            .config
            .max_concurrent_searches
            .map(|limit| Arc::new(Semaphore::new(limit)));

        let handles: Vec<_> = plan
            .searches
            .iter()
            .map(|item| {
                let executor = Arc::clone(&self.executor);
                let semaphore = semaphore.clone();
                let task = item.task();
                let query = item.query.clone();

                tokio::spawn(async move {
                    let _permit = match semaphore {
                        Some(semaphore) => Some(semaphore.acquire_owned().await.ok()?),
                        None => None,
                    };

                    let searcher = catalog::search_agent();
                    match executor.execute(&searcher, &task).await {
                        Ok(ExecutionResult::Failed(err)) => {
                            warn!(query = %query, error = %err, "Search failed");
                            None
                        }
                        Ok(result) => {
                            let text = result.into_text();
                            let summary = strip_transcript_header(&text).trim();
                            (!summary.is_empty()).then(|| summary.to_string())
                        }
                        Err(e) => {
                            warn!(query = %query, error = %e, "Search failed");
                            None
                        }
                    }
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(total);
        for (index, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(index, error = %e, "Search task did not complete");
                    None
                }
            };
            outcomes.push(outcome);
            self.emit(Stage::Searching, index + 1, total);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_some()).count();
        info!(succeeded, total, "Searches finished");
        outcomes
    }

    pub async fn write(&self, query: &str, summaries: &[String]) -> Result<Report> {
        info!("Thinking about report...");
        self.emit(Stage::Writing, 0, 1);

        let writer = catalog::writer_agent();
        let task = format!(
            "Original query: {}\nSummarized search results: {}",
            query,
            summaries.join("\n\n")
        );
        let report: Report = self.executor.execute_as(&writer, &task).await?;

        self.emit(Stage::Writing, 1, 1);
        info!("Report complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_transcript_header() {
        let rendered = format!("{}\n\nTask: t\nResponse: the summary", TRANSCRIPT_HEADER);
        assert_eq!(strip_transcript_header(&rendered), "the summary");
        assert_eq!(strip_transcript_header("plain text"), "plain text");
    }
}
