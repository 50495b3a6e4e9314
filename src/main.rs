use agentry::agents::{catalog, Decision};
use agentry::cli::output::Output;
use agentry::cli::{Cli, Commands};
use agentry::utils::toml_config::LoggingConfig;
use agentry::{AgentryConfig, AppState, ExecutionResult};
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the shell.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = AgentryConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Weather { task } => {
            let state = AppState::from_config(config);
            let result = state
                .executor
                .execute(&catalog::weather_agent(), &task)
                .await?;
            print_transcript(&output, &result, &task);
        }
        Commands::Triage { task } => {
            let state = AppState::from_config(config);
            let outcome = state
                .handoff()
                .route_detailed(&catalog::triage_agent(), &task, &[])
                .await?;
            match &outcome.decision {
                Decision::Delegated { target } => output.info(&format!("Handed off to {}", target)),
                Decision::Direct => output.info("Answered by triage"),
            }
            print_transcript(&output, &outcome.result, &task);
        }
        Commands::Research { query } => {
            let state = AppState::from_config(config);
            run_research(&state, &query, &output).await?;
        }
        Commands::Config { validate } => {
            show_config(&config, &output);
            let missing = config.missing_env_vars();
            if missing.is_empty() {
                output.success("All required environment variables are set");
            } else {
                output.subheader("Unset environment variables");
                for name in &missing {
                    output.list_item(name);
                }
                if validate {
                    anyhow::bail!("{} environment variable(s) unset", missing.len());
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let init = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    init.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

fn print_transcript(output: &Output, result: &ExecutionResult, task: &str) {
    match result {
        ExecutionResult::Failed(err) => output.error(&format!("{} ({})", err.message, err.kind)),
        other => output.body(&other.transcript(task)),
    }
}

async fn run_research(state: &AppState, query: &str, output: &Output) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let colored = output.colored;
    let printer = tokio::spawn(async move {
        let output = if colored {
            Output::new()
        } else {
            Output::no_color()
        };
        while let Some(event) = rx.recv().await {
            output.progress(&event);
        }
    });

    let pipeline = state.research().with_progress(tx);
    let report = pipeline.run(query).await;
    // Closes the channel so the printer drains and exits.
    drop(pipeline);
    printer.await.context("progress printer panicked")?;

    output.report(&report?);
    Ok(())
}

fn show_config(config: &AgentryConfig, output: &Output) {
    output.banner();
    output.header("Configuration");
    output.kv("default model", &config.default_model);

    output.subheader("Models");
    let mut models: Vec<_> = config.models.iter().collect();
    models.sort_by(|a, b| a.0.cmp(b.0));
    for (alias, model) in models {
        let target = model
            .model
            .clone()
            .or_else(|| model.model_env.as_ref().map(|env| format!("${}", env)))
            .unwrap_or_default();
        output.kv(alias, &format!("{} via {}", target, model.provider));
    }

    output.subheader("Research");
    let research = &config.research;
    output.kv(
        "searches",
        &format!(
            "{}..={} (enforced: {})",
            research.min_searches, research.max_searches, research.enforce_plan_size
        ),
    );
    if let Some(limit) = research.max_concurrent_searches {
        output.kv("max concurrent", &limit.to_string());
    }
    output.kv(
        "tool iterations",
        &config.execution.max_tool_iterations.to_string(),
    );
}
