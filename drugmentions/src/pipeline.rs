//! # Pipeline runner
//!
//! One batch run, start to finish:
//!
//! 1. **Load**: read and clean the drug list and both corpora
//! 2. **Link**: build the mention graph (sequential or sharded by drug)
//! 3. **Flatten**: derive the simplified graph
//! 4. **Persist**: write both graphs
//! 5. **Aggregate**: leading journal and publication-only drugs, then write them
//!
//! Any failure aborts the run; nothing is retried.

use crate::aggregate::{drugs_only_pubmed, journal_with_most_drug_mentions, TopJournal};
use crate::config::PipelineConfig;
use crate::document::save_as_json;
use crate::error::Result;
use crate::graph::{build, build_parallel, MentionGraph};
use crate::simplify::{simplify, SimplifiedGraph};
use drugscraper::{load_clean_data, CleanedInputs};
use tracing::{debug, info};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub drug_count: usize,
    pub pubmed_count: usize,
    pub clinical_trial_count: usize,
    /// Drugs found in neither corpus
    pub unmentioned_count: usize,
    pub journal_with_most_drug_mentions: String,
    pub drugs_only_pubmed: Vec<String>,
}

/// Both graphs of a run, before anything is written
#[derive(Debug, Clone)]
pub struct LinkedMentions {
    pub graph: MentionGraph,
    pub simplified: SimplifiedGraph,
}

/// Build the mention graph and its flattened form from cleaned inputs
pub fn link_mentions(inputs: &CleanedInputs, parallel: bool) -> LinkedMentions {
    let graph = if parallel {
        build_parallel(&inputs.drugs, &inputs.pubmed, &inputs.clinical_trials)
    } else {
        build(&inputs.drugs, &inputs.pubmed, &inputs.clinical_trials)
    };
    let simplified = simplify(&graph);

    LinkedMentions { graph, simplified }
}

/// Run the whole pipeline described by `config`
///
/// # Errors
///
/// Returns error if:
/// - An input is missing or malformed
/// - An output document cannot be written
/// - No journal carries any mention (`MentionError::EmptyCorpus`)
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    let inputs = load_clean_data(&config.inputs)?;
    run_on_inputs(&inputs, config)
}

/// Run every step after loading
pub fn run_on_inputs(inputs: &CleanedInputs, config: &PipelineConfig) -> Result<PipelineReport> {
    info!(
        "Start building drug mentions graph ({} drugs, {})",
        inputs.drugs.len(),
        if config.parallel { "parallel" } else { "sequential" }
    );
    let LinkedMentions { graph, simplified } = link_mentions(inputs, config.parallel);
    let unmentioned_count = graph.unmentioned_count();
    info!("Drug mentions graph built successfully");
    debug!("{} drugs without any mention", unmentioned_count);

    save_as_json(&graph, &config.outputs.drug_mentions)?;
    save_as_json(&simplified, &config.outputs.simplified_drug_mentions)?;
    info!(
        "Saved {} and {}",
        config.outputs.drug_mentions.display(),
        config.outputs.simplified_drug_mentions.display()
    );

    let journal = journal_with_most_drug_mentions(&simplified)?;
    let only_pubmed = drugs_only_pubmed(&simplified);
    info!(
        "Journal with most drug mentions: {}; {} drugs only in publications",
        journal,
        only_pubmed.len()
    );

    save_as_json(
        &TopJournal {
            journal_with_most_drug_mentions: journal.clone(),
        },
        &config.outputs.most_drug_mentions_journal,
    )?;
    save_as_json(&only_pubmed, &config.outputs.drugs_only_pubmed)?;

    Ok(PipelineReport {
        drug_count: inputs.drugs.len(),
        pubmed_count: inputs.pubmed.len(),
        clinical_trial_count: inputs.clinical_trials.len(),
        unmentioned_count,
        journal_with_most_drug_mentions: journal,
        drugs_only_pubmed: only_pubmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MentionError;
    use chrono::NaiveDate;
    use drugscraper::{Drug, TitleRecord};
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn inputs() -> CleanedInputs {
        CleanedInputs {
            drugs: vec![
                Drug::new("A04AD", "DIPHENHYDRAMINE"),
                Drug::new("S03AA", "TETRACYCLINE"),
                Drug::new("R01AD", "BETAMETHASONE"),
            ],
            pubmed: vec![
                TitleRecord::new("1", "Diphenhydramine for pruritus", "Journal of emergency nursing", day(1)),
                TitleRecord::new("2", "Tetracycline Resistance Patterns", "Psychopharmacology", day(2)),
                TitleRecord::new("3", "Tetracycline and diphenhydramine", "Psychopharmacology", day(3)),
            ],
            clinical_trials: vec![TitleRecord::new(
                "NCT04153396",
                "Preemptive Infiltration With Betamethasone",
                "Psychopharmacology",
                day(4),
            )],
        }
    }

    #[test]
    fn test_link_mentions_is_deterministic() {
        let inputs = inputs();

        let first = link_mentions(&inputs, false);
        let second = link_mentions(&inputs, false);
        let sharded = link_mentions(&inputs, true);

        let doc = |linked: &LinkedMentions| {
            (
                serde_json::to_string(&linked.graph).unwrap(),
                serde_json::to_string(&linked.simplified).unwrap(),
            )
        };
        assert_eq!(doc(&first), doc(&second));
        assert_eq!(doc(&first), doc(&sharded));
    }

    #[test]
    fn test_run_on_inputs_writes_four_documents() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::default().with_output_dir(dir.path());

        let report = run_on_inputs(&inputs(), &config).unwrap();

        assert_eq!(report.journal_with_most_drug_mentions, "Psychopharmacology");
        assert_eq!(report.drugs_only_pubmed, vec!["DIPHENHYDRAMINE", "TETRACYCLINE"]);
        assert_eq!(report.unmentioned_count, 0);
        assert!(config.outputs.drug_mentions.exists());
        assert!(config.outputs.simplified_drug_mentions.exists());
        assert!(config.outputs.most_drug_mentions_journal.exists());
        assert!(config.outputs.drugs_only_pubmed.exists());
    }

    #[test]
    fn test_run_on_inputs_without_mentions_fails() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::default().with_output_dir(dir.path());
        let mut inputs = inputs();
        inputs.pubmed.clear();
        inputs.clinical_trials.clear();

        let err = run_on_inputs(&inputs, &config).unwrap_err();

        assert!(matches!(err, MentionError::EmptyCorpus));
        assert!(config.outputs.drug_mentions.exists());
        assert!(!config.outputs.most_drug_mentions_journal.exists());
    }
}
