//! # Loader
//!
//! Reads the reference drug list and the two title corpora from disk and
//! cleans them into [`Drug`] and [`TitleRecord`] values.
//!
//! ## Pipeline Overview
//!
//! 1. **Data Loading**: Read `drugs.csv`, `pubmed.csv`, `pubmed.json` and `clinical_trials.csv`
//! 2. **Column Check**: Reject any file missing a required column
//! 3. **Row Cleaning**: Parse dates, normalize ids, trim trial titles, strip escaped byte
//!    artifacts from trial journals (rows are cleaned in parallel with Rayon)
//! 4. **Null Filtering**: Drop rows with any missing field
//! 5. **Union**: Append JSON publications after CSV publications
//! 6. **Deduplication**: Drop exact duplicate rows, keeping the first occurrence

use crate::dates::parse_date;
use crate::error::{Result, ScrapeError};
use crate::records::{Drug, TitleRecord};
use chrono::NaiveDate;
use csv::Reader;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::hash::Hash;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DRUG_COLUMNS: &[&str] = &["atccode", "drug"];
const PUBMED_COLUMNS: &[&str] = &["id", "title", "date", "journal"];
const TRIAL_COLUMNS: &[&str] = &["id", "scientific_title", "date", "journal"];

// ============================================================================
// Input locations
// ============================================================================

/// Locations of the four raw input files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Reference drug list (`atccode`, `drug`)
    pub drugs: PathBuf,

    /// Publications in CSV form (`id`, `title`, `date`, `journal`)
    pub pubmed_csv: PathBuf,

    /// Publications in JSON form (array of objects with the CSV columns)
    pub pubmed_json: PathBuf,

    /// Clinical trials (`id`, `scientific_title`, `date`, `journal`)
    pub clinical_trials: PathBuf,
}

impl InputPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            drugs: dir.join("drugs.csv"),
            pubmed_csv: dir.join("pubmed.csv"),
            pubmed_json: dir.join("pubmed.json"),
            clinical_trials: dir.join("clinical_trials.csv"),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::in_dir("data/raw")
    }
}

/// Cleaned inputs ready for mention linking
#[derive(Debug, Clone, Default)]
pub struct CleanedInputs {
    pub drugs: Vec<Drug>,
    /// CSV and JSON publications, concatenated and deduplicated
    pub pubmed: Vec<TitleRecord>,
    pub clinical_trials: Vec<TitleRecord>,
}

// ============================================================================
// Raw row shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawDrugRow {
    atccode: Option<String>,
    drug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPublicationRow {
    id: Option<String>,
    title: Option<String>,
    date: Option<String>,
    journal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrialRow {
    id: Option<String>,
    scientific_title: Option<String>,
    date: Option<String>,
    journal: Option<String>,
}

// ============================================================================
// Cleaning rules
// ============================================================================

/// Row-level cleaning rules
///
/// Holds the compiled patterns so they are built once per load rather than
/// once per row.
struct Cleaner {
    /// Escaped byte sequences left behind by a broken encoding, e.g. the
    /// literal text `\xc3\x28`
    escaped_bytes: Regex,
}

/// Parse a date cell, treating blank text as missing
fn present_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.filter(|d| !d.trim().is_empty()).map(parse_date).transpose()
}

impl Cleaner {
    fn new() -> Self {
        Self {
            escaped_bytes: Regex::new(r"(?:\\x[0-9a-fA-F]{2})+").expect("escaped byte pattern"),
        }
    }

    fn clean_publication(&self, row: RawPublicationRow) -> Result<Option<TitleRecord>> {
        // dates are parsed before null filtering so a bad date always surfaces
        let date = present_date(row.date.as_deref())?;

        Ok(match (row.id, row.title, row.journal, date) {
            (Some(id), Some(title), Some(journal), Some(date)) => {
                Some(TitleRecord { id, title, journal, date })
            }
            _ => None,
        })
    }

    fn clean_trial(&self, row: RawTrialRow) -> Result<Option<TitleRecord>> {
        let date = present_date(row.date.as_deref())?;

        let title = row
            .scientific_title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let journal = row
            .journal
            .map(|j| self.escaped_bytes.replace_all(&j, "").into_owned());

        Ok(match (row.id, title, journal, date) {
            (Some(id), Some(title), Some(journal), Some(date)) => {
                Some(TitleRecord { id, title, journal, date })
            }
            _ => None,
        })
    }
}

/// Drop exact duplicates, keeping the first occurrence
///
/// Returns the surviving rows in their original order and the number removed.
fn dedup_keep_first<T: Hash + Eq + Clone>(rows: Vec<T>) -> (Vec<T>, usize) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(rows.len());
    let mut duplicate_count = 0;

    for row in rows {
        if seen.insert(row.clone()) {
            unique.push(row);
        } else {
            duplicate_count += 1;
        }
    }

    (unique, duplicate_count)
}

/// Fail with `MissingColumn` unless every required header is present
fn require_headers<R: Read>(
    reader: &mut Reader<R>,
    origin: &Path,
    required: &[&'static str],
) -> Result<()> {
    let headers = reader.headers()?;
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(ScrapeError::MissingColumn {
                path: origin.to_path_buf(),
                column: *column,
            });
        }
    }
    Ok(())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Drug list
// ============================================================================

/// Load the reference drug list from a CSV file
pub fn load_drugs(path: &Path) -> Result<Vec<Drug>> {
    read_drugs(open(path)?, path)
}

/// Read the reference drug list from any CSV source
///
/// Rows missing either column value are dropped, then exact duplicates.
pub fn read_drugs<R: Read>(source: R, origin: &Path) -> Result<Vec<Drug>> {
    let mut reader = Reader::from_reader(source);
    require_headers(&mut reader, origin, DRUG_COLUMNS)?;

    let rows: Vec<RawDrugRow> = reader.deserialize().collect::<std::result::Result<_, _>>()?;
    let total = rows.len();

    let drugs: Vec<Drug> = rows
        .into_iter()
        .filter_map(|row| match (row.atccode, row.drug) {
            (Some(atc_code), Some(name)) => Some(Drug { atc_code, name }),
            _ => None,
        })
        .collect();
    let dropped = total - drugs.len();

    let (drugs, duplicates) = dedup_keep_first(drugs);
    debug!(
        "{}: {} rows, {} incomplete, {} duplicates",
        origin.display(),
        total,
        dropped,
        duplicates
    );

    Ok(drugs)
}

// ============================================================================
// Publications
// ============================================================================

/// Load publications from a CSV file
pub fn load_pubmed_csv(path: &Path) -> Result<Vec<TitleRecord>> {
    read_pubmed_csv(open(path)?, path)
}

/// Read publications from any CSV source, without deduplication
pub fn read_pubmed_csv<R: Read>(source: R, origin: &Path) -> Result<Vec<TitleRecord>> {
    let mut reader = Reader::from_reader(source);
    require_headers(&mut reader, origin, PUBMED_COLUMNS)?;

    let rows: Vec<RawPublicationRow> =
        reader.deserialize().collect::<std::result::Result<_, _>>()?;
    let total = rows.len();

    let cleaner = Cleaner::new();
    let cleaned: Vec<Option<TitleRecord>> = rows
        .into_par_iter()
        .map(|row| cleaner.clean_publication(row))
        .collect::<Result<_>>()?;

    let records: Vec<TitleRecord> = cleaned.into_iter().flatten().collect();
    debug!(
        "{}: {} rows, {} incomplete",
        origin.display(),
        total,
        total - records.len()
    );

    Ok(records)
}

/// Load publications from a JSON file
pub fn load_pubmed_json(path: &Path) -> Result<Vec<TitleRecord>> {
    let mut text = String::new();
    open(path)?
        .read_to_string(&mut text)
        .map_err(|source| ScrapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    read_pubmed_json(&text, path)
}

/// Read publications from a JSON array of objects, without deduplication
///
/// Ids are made numeric: numbers are kept, numeric strings are parsed and
/// empty strings count as missing. Empty text fields other than `date` are
/// kept as-is.
pub fn read_pubmed_json(text: &str, origin: &Path) -> Result<Vec<TitleRecord>> {
    let objects: Vec<Map<String, Value>> =
        serde_json::from_str(text).map_err(|source| ScrapeError::Json {
            path: origin.to_path_buf(),
            source,
        })?;

    if !objects.is_empty() {
        for column in PUBMED_COLUMNS {
            if !objects.iter().any(|o| o.contains_key(*column)) {
                return Err(ScrapeError::MissingColumn {
                    path: origin.to_path_buf(),
                    column: *column,
                });
            }
        }
    }

    let total = objects.len();
    let rows = objects
        .iter()
        .map(|object| {
            Ok(RawPublicationRow {
                id: numeric_id(object.get("id"))?,
                title: text_field(object, "title", origin)?,
                date: text_field(object, "date", origin)?,
                journal: text_field(object, "journal", origin)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cleaner = Cleaner::new();
    let cleaned: Vec<Option<TitleRecord>> = rows
        .into_par_iter()
        .map(|row| cleaner.clean_publication(row))
        .collect::<Result<_>>()?;

    let records: Vec<TitleRecord> = cleaned.into_iter().flatten().collect();
    debug!(
        "{}: {} rows, {} incomplete",
        origin.display(),
        total,
        total - records.len()
    );

    Ok(records)
}

fn text_field(
    object: &Map<String, Value>,
    field: &'static str,
    origin: &Path,
) -> Result<Option<String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(ScrapeError::InvalidField {
            path: origin.to_path_buf(),
            field,
            value: other.to_string(),
        }),
    }
}

fn numeric_id(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => integral_id(n).map(Some),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(id) = s.parse::<i64>() {
                return Ok(Some(id.to_string()));
            }
            match s.parse::<f64>() {
                Ok(id) => float_id(id, s).map(Some),
                Err(_) => Err(ScrapeError::InvalidId(s.to_string())),
            }
        }
        Some(other) => Err(ScrapeError::InvalidId(other.to_string())),
    }
}

fn integral_id(n: &serde_json::Number) -> Result<String> {
    if let Some(id) = n.as_i64() {
        Ok(id.to_string())
    } else if let Some(id) = n.as_u64() {
        Ok(id.to_string())
    } else {
        match n.as_f64() {
            Some(id) => float_id(id, &n.to_string()),
            None => Err(ScrapeError::InvalidId(n.to_string())),
        }
    }
}

/// Truncate a float id, rejecting values with no `i64` counterpart
fn float_id(id: f64, raw: &str) -> Result<String> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if id.is_finite() && id >= i64::MIN as f64 && id < i64::MAX as f64 {
        Ok((id.trunc() as i64).to_string())
    } else {
        Err(ScrapeError::InvalidId(raw.to_string()))
    }
}

// ============================================================================
// Clinical trials
// ============================================================================

/// Load clinical trials from a CSV file
pub fn load_clinical_trials(path: &Path) -> Result<Vec<TitleRecord>> {
    read_clinical_trials(open(path)?, path)
}

/// Read clinical trials from any CSV source
///
/// The `scientific_title` column becomes [`TitleRecord::title`]. Titles are
/// trimmed (blank ones count as missing) and escaped byte artifacts are
/// removed from journal names. Exact duplicates are dropped.
pub fn read_clinical_trials<R: Read>(source: R, origin: &Path) -> Result<Vec<TitleRecord>> {
    let mut reader = Reader::from_reader(source);
    require_headers(&mut reader, origin, TRIAL_COLUMNS)?;

    let rows: Vec<RawTrialRow> = reader.deserialize().collect::<std::result::Result<_, _>>()?;
    let total = rows.len();

    let cleaner = Cleaner::new();
    let cleaned: Vec<Option<TitleRecord>> = rows
        .into_par_iter()
        .map(|row| cleaner.clean_trial(row))
        .collect::<Result<_>>()?;

    let records: Vec<TitleRecord> = cleaned.into_iter().flatten().collect();
    let incomplete = total - records.len();

    let (records, duplicates) = dedup_keep_first(records);
    debug!(
        "{}: {} rows, {} incomplete, {} duplicates",
        origin.display(),
        total,
        incomplete,
        duplicates
    );

    Ok(records)
}

// ============================================================================
// Entry point
// ============================================================================

/// Load and clean every input of a pipeline run
///
/// # Arguments
///
/// * `paths` - Locations of the four raw input files
///
/// # Returns
///
/// The drug list and both corpora, cleaned and deduplicated
///
/// # Errors
///
/// Returns error if:
/// - A file cannot be opened or parsed
/// - A required column is missing
/// - A date or a JSON id is malformed
pub fn load_clean_data(paths: &InputPaths) -> Result<CleanedInputs> {
    info!("Start loading files");
    let drugs = load_drugs(&paths.drugs)?;
    let pubmed_csv = load_pubmed_csv(&paths.pubmed_csv)?;
    let pubmed_json = load_pubmed_json(&paths.pubmed_json)?;
    let clinical_trials = load_clinical_trials(&paths.clinical_trials)?;

    info!("Start cleaning data");
    let mut pubmed = pubmed_csv;
    pubmed.extend(pubmed_json);
    let (pubmed, duplicates) = dedup_keep_first(pubmed);
    debug!("Removed {} duplicate publications", duplicates);

    info!(
        "Files successfully loaded and cleaned: {} drugs, {} publications, {} clinical trials",
        drugs.len(),
        pubmed.len(),
        clinical_trials.len()
    );

    Ok(CleanedInputs {
        drugs,
        pubmed,
        clinical_trials,
    })
}
