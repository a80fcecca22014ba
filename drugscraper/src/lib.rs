//! # Drugscraper
//!
//! Loads the raw inputs of the drug mention pipeline and cleans them into
//! typed records: the reference drug list, the publication corpus (CSV and
//! JSON sources merged) and the clinical trial corpus.
//!
//! ## Cleaning Rules
//!
//! - **Dates**: mixed textual formats are normalized to calendar dates
//! - **Ids**: JSON publication ids are made numeric
//! - **Trial titles**: trimmed, blank titles count as missing
//! - **Trial journals**: escaped byte artifacts (`\xc3\x28`) are stripped
//! - **Nulls**: rows with any missing field are dropped
//! - **Duplicates**: exact duplicate rows are dropped, first occurrence kept
//!
//! ## Usage
//!
//! ```no_run
//! use drugscraper::{load_clean_data, InputPaths};
//!
//! let inputs = load_clean_data(&InputPaths::in_dir("data/raw"))?;
//! println!("{} drugs loaded", inputs.drugs.len());
//! # Ok::<(), drugscraper::ScrapeError>(())
//! ```

pub mod dates;
pub mod error;
pub mod loader;
pub mod records;

pub use dates::parse_date;
pub use error::{Result, ScrapeError};
pub use loader::{
    load_clean_data, load_clinical_trials, load_drugs, load_pubmed_csv, load_pubmed_json,
    read_clinical_trials, read_drugs, read_pubmed_csv, read_pubmed_json, CleanedInputs,
    InputPaths,
};
pub use records::{Drug, TitleRecord};
