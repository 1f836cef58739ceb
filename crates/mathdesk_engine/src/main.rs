//! Mathdesk CLI.
//!
//! Solves one math word problem per invocation against a local
//! Ollama-compatible backend.

use anyhow::{Context, Result};
use clap::Parser;
use mathdesk_engine::config::EngineConfig;
use mathdesk_engine::executor::ExecutorAgent;
use mathdesk_engine::llm::OllamaClient;
use mathdesk_engine::pipeline::Pipeline;
use mathdesk_engine::planner::PlannerAgent;
use mathdesk_engine::refiner::RefinerAgent;
use mathdesk_engine::retrieval::CorpusRetriever;
use mathdesk_engine::tools::ToolRegistry;
use mathdesk_common::format_trace;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mathdesk", version, about = "Multi-stage math problem solver")]
struct Cli {
    /// The problem to solve.
    problem: String,

    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit the full solution record as JSON.
    #[arg(long)]
    json: bool,

    /// Print the execution trace after the answer.
    #[arg(long)]
    show_trace: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let client = OllamaClient::with_profile_models(
        config.planner_model.clone(),
        config.executor_model.clone(),
        config.refiner_model.clone(),
    )
    .with_base_url(config.base_url.clone())
    .with_keep_alive(config.keep_alive.clone())
    .with_timeout(Duration::from_secs(config.request_timeout_secs));
    if !client.is_available().await {
        warn!(base_url = %config.base_url, "generation backend not reachable");
    }
    let generation = Arc::new(client);

    let retrieval = match (&config.decomposition_corpus, &config.tool_corpus) {
        (Some(decomposition), Some(tool)) => Arc::new(
            CorpusRetriever::from_files(decomposition, tool)
                .context("loading example corpora")?,
        ),
        _ => Arc::new(CorpusRetriever::builtin()),
    };

    let pipeline = Pipeline::new(
        PlannerAgent::new(
            generation.clone(),
            retrieval.clone(),
            config.retrieval_top_k,
            config.planner_params(),
        ),
        ExecutorAgent::new(
            generation.clone(),
            retrieval.clone(),
            ToolRegistry::with_limits(config.solver_limits()),
            config.retrieval_top_k,
            config.executor_params(),
        ),
        RefinerAgent::new(generation, config.refiner_params()),
        config.memory_size,
    );

    let solution = pipeline.solve(&cli.problem).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
        return Ok(());
    }

    println!("{}", solution.answer);
    if cli.show_trace {
        println!("\n{}", format_trace(&solution.trace));
    }
    Ok(())
}
