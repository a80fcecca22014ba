//! Drugmentions CLI - runs the drug mention pipeline once over the raw inputs.
//!
//! ```bash
//! cargo run --release -p drugmentions -- --raw-dir data/raw --output-dir data/output
//! ```

use anyhow::Context;
use clap::Parser;
use drugmentions::cli::DEFAULT_LOG_FILTER;
use drugmentions::{run_pipeline, Cli};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter '{}'", directive))?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?,
    };

    // scoped to this run rather than installed process-wide
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    let config = cli.resolve_config()?;

    tracing::subscriber::with_default(subscriber, || -> anyhow::Result<()> {
        info!("Starting pipeline");
        let report = run_pipeline(&config).context("pipeline run failed")?;
        info!(
            "End of processing: {} drugs, {} publications, {} clinical trials, {} without mention",
            report.drug_count,
            report.pubmed_count,
            report.clinical_trial_count,
            report.unmentioned_count
        );
        Ok(())
    })
}
