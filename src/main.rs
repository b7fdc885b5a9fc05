//! # Deep Research
//!
//! Command-line front end for the multi-round research engine in
//! `research-core`.
//!
//! Each run searches the web, extracts page text, asks a language model for
//! findings and gaps, repeats with follow-up queries, and finally prints a
//! Markdown report (also saved under `outputs/`).
//!
//! ## Quick Start
//! ```bash
//! export DEEPSEEK_API_KEY=sk-...
//! cargo run -- "What are the latest developments in Rust async?"
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================
/// Configuration management
mod config;

/// Markdown / JSON export
mod export;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use research_core::{ProgressReporter, ProviderKind, ResearchOptions, ResearchOrchestrator};

use crate::config::Config;
use crate::export::Exporter;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    version,
    about = "Iterative multi-round web research with LLM analysis",
    long_about = r#"
Deep Research - multi-round research reports from the command line.

Each round:
  1. Searches the web (DuckDuckGo) for the current queries
  2. Extracts readable text from the top result pages
  3. Asks the language model for key findings and information gaps

Rounds continue with model-generated follow-up queries until no gaps remain
or the round limit is reached. A final Markdown report is then written.

CONFIGURATION (environment or .env):
  AI_PROVIDER            deepseek | openai | anthropic (default: deepseek)
  DEEPSEEK_API_KEY       OPENAI_API_KEY       ANTHROPIC_API_KEY
  MAX_RESEARCH_ROUNDS    RESULTS_PER_SEARCH   MAX_CONCURRENT_REQUESTS
  REQUEST_TIMEOUT_SECS   LLM_TIMEOUT_SECS     DEEPSEEK_BASE_URL
  OUTPUT_DIR             RUST_LOG

EXAMPLES:
  deep-research "quantum error correction"
  deep-research --provider openai --rounds 2 "Rust web frameworks 2024"
  deep-research --json --output-dir reports "LLM agent memory"
"#
)]
struct Args {
    /// The research topic
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Model backend
    #[arg(short = 'p', long = "provider", env = "AI_PROVIDER")]
    provider: Option<ProviderKind>,

    /// Model name (overrides <PROVIDER>_MODEL)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Maximum research rounds
    #[arg(short = 'r', long = "rounds", env = "MAX_RESEARCH_ROUNDS")]
    rounds: Option<usize>,

    /// Search results per query
    #[arg(long = "results", env = "RESULTS_PER_SEARCH")]
    results: Option<usize>,

    /// Concurrent page fetches
    #[arg(short = 'c', long = "concurrency", env = "MAX_CONCURRENT_REQUESTS")]
    concurrency: Option<usize>,

    /// Output directory for exported reports
    #[arg(short = 'o', long = "output-dir", env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Also export the full research result as JSON
    #[arg(long = "json", default_value = "false")]
    json: bool,

    /// Print the report without writing files
    #[arg(long = "no-export", default_value = "false")]
    no_export: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads its env fallbacks
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    init_logging(&config.log_level, args.verbose)?;

    info!("Deep Research starting up...");

    apply_overrides(&mut config, &args);
    config.validate()?;

    let llm = config.llm_settings();
    info!(
        provider = %llm.provider,
        model = %llm.effective_model(),
        max_rounds = config.research.max_rounds,
        "Configuration loaded"
    );

    let orchestrator = ResearchOrchestrator::from_settings(&llm, config.research.clone())
        .context("Failed to initialize research engine")?;

    let progress = ProgressReporter::from_fn(|message, current, total| {
        eprintln!("[{}/{}] {}", current, total, message);
    });

    let result = match orchestrator
        .conduct_research(&args.topic, ResearchOptions::default(), &progress)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Research failed");
            eprintln!("\nResearch failed: {}", e);
            return Err(e.into());
        }
    };

    println!("\n{}", "=".repeat(60));
    println!(
        "RESEARCH REPORT ({} rounds, {} sources)",
        result.total_rounds,
        result.all_sources.len()
    );
    println!("{}\n", "=".repeat(60));
    println!("{}", result.final_report);
    println!("\n{}", "=".repeat(60));

    if !args.no_export {
        let exporter = Exporter::new(&config.output_dir);
        let path = exporter.export_markdown(&result)?;
        eprintln!("Report saved to {}", path.display());

        if args.json {
            let path = exporter.export_json(&result)?;
            eprintln!("Research data saved to {}", path.display());
        }
    }

    info!("Research completed successfully");
    Ok(())
}

/// Command-line flags win over environment configuration
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(provider) = args.provider {
        info!(provider = %provider, "Using provider from command line");
        config.provider = provider;
    }
    if let Some(model) = &args.model {
        config.model_override = Some(model.clone());
    }
    if let Some(rounds) = args.rounds {
        config.research.max_rounds = rounds;
    }
    if let Some(results) = args.results {
        config.research.results_per_search = results;
    }
    if let Some(concurrency) = args.concurrency {
        config.research.max_concurrent_requests = concurrency;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber.
///
/// `--verbose` forces debug output; otherwise the `RUST_LOG` directive from
/// the configuration applies. Logs go to stderr so stdout holds only the
/// report.
fn init_logging(log_level: &str, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
