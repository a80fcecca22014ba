//! Command-line arguments.

use crate::config::PipelineConfig;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Log filter used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "drugmentions=info,drugscraper=info";

/// Link drug names to publication and clinical trial titles.
#[derive(Debug, Parser)]
#[command(name = "drugmentions")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "DRUGMENTIONS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding drugs.csv, pubmed.csv, pubmed.json and clinical_trials.csv
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Directory receiving the output documents
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Match drugs against titles on all CPU cores
    #[arg(long)]
    pub parallel: bool,

    /// Log filter, e.g. `debug` or `drugscraper=debug`
    #[arg(long, env = "DRUGMENTIONS_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge the configuration file (if any) with command-line overrides
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.raw_dir {
            config = config.with_raw_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok(config)
    }
}
