//! Multi-Agent Research Pipeline
//!
//! Three strictly ordered stages, each a run of a dedicated agent:
//!
//! 1. **Plan** - the planner returns a [`SearchPlan`] (structured, fatal on mismatch)
//! 2. **Search** - one concurrent search per item; failures become empty slots
//! 3. **Write** - the writer turns the surviving summaries into a [`Report`]
//!
//! # Usage
//!
//! ```ignore
//! use agentry::research::ResearchPipeline;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let pipeline = ResearchPipeline::new(executor, config.research.clone()).with_progress(tx);
//! let report = pipeline.run("renewable energy trends").await?;
//! println!("{}", report.markdown_body);
//! ```

/// The plan/search/write pipeline.
pub mod pipeline;
/// Plans, outcomes, reports and progress events.
pub mod types;

pub use pipeline::{strip_transcript_header, ResearchPipeline};
pub use types::{ProgressEvent, Report, SearchItem, SearchOutcome, SearchPlan, Stage};
