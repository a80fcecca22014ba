//! # Drugmentions
//!
//! Links a reference list of drug names to their occurrences in publication
//! titles and clinical trial titles, then answers two questions about the
//! result: which journal mentions the most distinct drugs, and which drugs
//! appear in publications only.
//!
//! ## Pipeline Overview
//!
//! 1. **Loading**: `drugscraper` reads and cleans the raw inputs
//! 2. **Matching**: case-insensitive substring search of each drug in each title ([`matcher`])
//! 3. **Graph**: drug → `{pubmed, clinicalTrials}` mentions ([`graph`])
//! 4. **Flattening**: drug → list of `{journal, date, source}` ([`simplify`])
//! 5. **Aggregation**: leading journal and single-provenance drugs ([`aggregate`])
//! 6. **Persistence**: JSON documents with ISO dates ([`document`])
//!
//! Every step past loading is a pure function of its inputs; logging happens
//! only in the pipeline runner.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod pipeline;
pub mod simplify;

pub use aggregate::{
    drugs_only_in, drugs_only_pubmed, drugs_per_journal, journal_with_most_drug_mentions,
    TopJournal,
};
pub use cli::Cli;
pub use config::{OutputPaths, PipelineConfig};
pub use document::{read_json, save_as_json, to_document};
pub use drugscraper::{CleanedInputs, Drug, InputPaths, TitleRecord};
pub use error::{MentionError, Result, SerializeError};
pub use graph::{build, build_parallel, DrugMentions, Mention, MentionGraph};
pub use matcher::{filter_titles, matches};
pub use pipeline::{link_mentions, run_on_inputs, run_pipeline, LinkedMentions, PipelineReport};
pub use simplify::{simplify, SimplifiedGraph, SimplifiedMention, Source};
