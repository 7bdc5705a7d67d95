//! rustpubmed - PubMed non-academic author finder
//!
//! Searches PubMed, keeps papers with at least one author affiliated to a
//! pharmaceutical/biotech company, and writes them as CSV.
//!
//! ## Usage
//!
//! ```bash
//! rustpubmed "CRISPR gene editing" --file papers.csv
//! rustpubmed "cancer immunotherapy" --debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rustpubmed::eutils::{ClientConfig, PubmedClient, DEFAULT_MAX_RESULTS, EUTILS_BASE_URL};
use rustpubmed::export::{self, WriteMode};
use rustpubmed::pipeline::{self, PipelineOutcome};
use rustpubmed::rules::ClassifierRules;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers with non-academic authors
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Search query for PubMed
    query: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Output filename (CSV). If not provided, prints to console
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Maximum number of search results
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Classifier rules file (JSON with "keywords" and "email_pattern")
    #[arg(long)]
    rules: Option<PathBuf>,

    /// NCBI API key
    #[arg(long)]
    api_key: Option<String>,

    /// E-utilities base URL
    #[arg(long, default_value = EUTILS_BASE_URL)]
    base_url: String,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr; stdout carries CSV output
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(query = %cli.query, "Starting");

    let rules = ClassifierRules::load(cli.rules.as_deref()).context("Failed to load classifier rules")?;
    let client = PubmedClient::new(ClientConfig {
        base_url: cli.base_url,
        api_key: cli.api_key,
        ..Default::default()
    })
    .context("Failed to create PubMed client")?;

    let outcome = pipeline::run(&client, &cli.query, cli.max_results, &rules)
        .await
        .context("PubMed request failed")?;

    let papers = match outcome {
        PipelineOutcome::NoResults => {
            println!("No papers found.");
            return Ok(());
        }
        PipelineOutcome::NoQualifying { fetched } => {
            debug!(fetched, "No article matched the keyword rules");
            println!("No relevant papers with non-academic authors found.");
            return Ok(());
        }
        PipelineOutcome::Papers(papers) => papers,
    };

    match cli.file {
        Some(path) => {
            let mode = export::save_csv(&path, &papers)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if mode != WriteMode::Skipped {
                println!("Results saved to {}", path.display());
            }
        }
        None => {
            export::write_csv(std::io::stdout().lock(), &papers, true)
                .context("Failed to write results")?;
        }
    }

    Ok(())
}
