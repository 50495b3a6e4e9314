//! CLI module for agentry
//!
//! Provides command-line interface parsing for the agentry binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default task for the weather command
pub const DEFAULT_WEATHER_TASK: &str = "What's the weather like in Paris right now?";

/// agentry - multi-agent delegation runtime
///
/// Runs a weather agent, a documentation/coding triage, and a
/// plan/search/write research pipeline against OpenAI or Azure OpenAI.
#[derive(Parser, Debug)]
#[command(
    name = "agentry",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "agentry - multi-agent delegation runtime",
    after_help = "EXAMPLES:\n    \
                  agentry weather --task \"Is it raining in Lima?\"\n    \
                  agentry triage --task \"Write a README for a CLI todo app\"\n    \
                  agentry research --query \"renewable energy trends\"\n    \
                  agentry config --validate"
)]
pub struct Cli {
    /// Path to the configuration file (built-in defaults when absent)
    #[arg(short, long, default_value = "agentry.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the weather agent a question
    Weather {
        /// The request for the weather agent
        #[arg(short, long, default_value = DEFAULT_WEATHER_TASK)]
        task: String,
    },

    /// Route a request to the documentation or coding specialist
    Triage {
        /// The request to route
        #[arg(short, long)]
        task: String,
    },

    /// Research a query and write a report
    Research {
        /// The research query
        #[arg(short, long)]
        query: String,
    },

    /// Show configuration information
    Config {
        /// Report unset environment variables and exit non-zero if any
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
