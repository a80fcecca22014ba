//! Pipeline configuration.
//!
//! Resolved once at startup and passed into [`crate::pipeline::run_pipeline`].
//! Precedence: command-line flags, then the TOML file, then defaults.
//!
//! ```toml
//! parallel = true
//!
//! [inputs]
//! drugs = "data/raw/drugs.csv"
//! pubmed_csv = "data/raw/pubmed.csv"
//! pubmed_json = "data/raw/pubmed.json"
//! clinical_trials = "data/raw/clinical_trials.csv"
//!
//! [outputs]
//! drug_mentions = "data/output/drug_mentions.json"
//! ```

use crate::error::{MentionError, Result};
use drugscraper::InputPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw input files
    pub inputs: InputPaths,

    /// Output documents
    pub outputs: OutputPaths,

    /// Shard mention matching across all CPU cores
    pub parallel: bool,
}

/// Locations of the four output documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    /// Full mention graph
    pub drug_mentions: PathBuf,

    /// Flattened mention graph
    pub simplified_drug_mentions: PathBuf,

    /// `{ "journal_with_most_drug_mentions": .. }`
    pub most_drug_mentions_journal: PathBuf,

    /// Drugs mentioned only in publications
    pub drugs_only_pubmed: PathBuf,
}

impl OutputPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            drug_mentions: dir.join("drug_mentions.json"),
            simplified_drug_mentions: dir.join("simplified_drug_mentions.json"),
            most_drug_mentions_journal: dir.join("most_drug_mentions_journal.json"),
            drugs_only_pubmed: dir.join("drugs_only_pubmed.json"),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir("data/output")
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| MentionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read inputs from the standard file names inside `dir`
    pub fn with_raw_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.inputs = InputPaths::in_dir(dir);
        self
    }

    /// Write outputs under the standard file names inside `dir`
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.outputs = OutputPaths::in_dir(dir);
        self
    }

    /// Reject output paths that would overwrite each other
    pub fn validate(&self) -> Result<()> {
        let outputs = [
            &self.outputs.drug_mentions,
            &self.outputs.simplified_drug_mentions,
            &self.outputs.most_drug_mentions_journal,
            &self.outputs.drugs_only_pubmed,
        ];
        for (i, path) in outputs.iter().enumerate() {
            if path.as_os_str().is_empty() {
                return Err(MentionError::Config("output path cannot be empty".into()));
            }
            if outputs[..i].contains(path) {
                return Err(MentionError::Config(format!(
                    "output path {} is used twice",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
