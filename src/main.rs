use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reverie_backend::config::EngineConfig;
use reverie_backend::llm_client::{LlmClient, Oracle};
use reverie_backend::prompts::{PromptGenerator, ReflectionSignals};
use reverie_backend::{AnalysisPipeline, ComposeSession};

#[derive(Parser)]
#[command(name = "reverie", version, about = "Reflective prompts and entry analysis")]
struct Args {
    /// Config file (defaults to reverie_config.toml next to the executable)
    #[arg(short, long, env = "REVERIE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a rotating sequence of prompts from a fresh session
    Prompt {
        /// TOML file with goals, habits, interests, recent_actions, vision, general
        #[arg(short, long)]
        signals: Option<PathBuf>,
        /// How many prompts to emit
        #[arg(short = 'n', long, default_value_t = 7)]
        count: usize,
        /// Text written so far
        #[arg(short, long, default_value = "")]
        draft: String,
    },
    /// Analyze a finished entry and print the result as JSON
    Analyze {
        /// File containing the entry text
        #[arg(short, long)]
        entry: PathBuf,
        /// TOML file whose goal_alignment directive guides the analysis
        #[arg(short, long)]
        signals: Option<PathBuf>,
    },
}

fn load_signals(path: Option<&Path>) -> Result<ReflectionSignals> {
    let Some(path) = path else {
        return Ok(ReflectionSignals::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read signals from {:?}", path))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse signals {:?}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reverie=debug,reverie_backend=debug")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load(),
    };
    tracing::info!("Using model {} at {}", config.llm_model, config.llm_api_url);

    let oracle: Arc<dyn Oracle> = Arc::new(
        LlmClient::from_config(&config).context("failed to build LLM client")?,
    );

    match args.command {
        Command::Prompt {
            signals,
            count,
            draft,
        } => {
            let signals = load_signals(signals.as_deref())?;
            let generator = PromptGenerator::new(oracle, &config);
            let mut session = ComposeSession::new(config.generation.history_capacity);

            for _ in 0..count {
                let candidate = session.next_prompt(&generator, &signals, &draft).await;
                let slot = candidate.slot.slot();
                println!(
                    "[{}] ({:?}) {}",
                    slot.label, candidate.provenance, candidate.text
                );
            }
        }
        Command::Analyze { entry, signals } => {
            let signals = load_signals(signals.as_deref())?;
            let text = std::fs::read_to_string(&entry)
                .with_context(|| format!("Failed to read entry from {:?}", entry))?;

            let pipeline = AnalysisPipeline::new(oracle, &config);
            let analysis = pipeline.analyze(&text, &signals.goal_alignment).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?
            );
        }
    }

    Ok(())
}
