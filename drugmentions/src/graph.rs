//! # Mention graph
//!
//! Links every reference drug to the publication and clinical trial rows
//! whose title mentions it.
//!
//! ## Shape
//!
//! ```text
//! { "<drug>": { "pubmed": [ {journal, date}, .. ], "clinicalTrials": [ {journal, date}, .. ] } }
//! ```
//!
//! Drugs keep reference-list order, mentions keep corpus row order, and a
//! drug with no mention at all still gets an entry with two empty lists.
//!
//! ## Cost
//!
//! Every drug scans every title of both corpora: O(drugs × titles). There
//! is no index. [`build_parallel`] spreads drugs over the Rayon pool and
//! yields exactly the same graph as [`build`].

use crate::document::iso_date;
use crate::matcher::filter_titles;
use chrono::NaiveDate;
use drugscraper::{Drug, TitleRecord};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A drug found in one title: the title's venue and date
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    pub journal: String,

    #[serde(with = "iso_date")]
    pub date: NaiveDate,
}

impl From<&TitleRecord> for Mention {
    fn from(record: &TitleRecord) -> Self {
        Self {
            journal: record.journal.clone(),
            date: record.date,
        }
    }
}

/// Mentions of one drug, split by corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugMentions {
    /// Mentions in publication titles
    pub pubmed: Vec<Mention>,

    /// Mentions in clinical trial scientific titles
    #[serde(rename = "clinicalTrials")]
    pub clinical_trials: Vec<Mention>,
}

impl DrugMentions {
    /// Scan both corpora for `drug`
    pub fn collect(drug: &str, pubmed: &[TitleRecord], clinical_trials: &[TitleRecord]) -> Self {
        Self {
            pubmed: filter_titles(drug, pubmed).into_iter().map(Mention::from).collect(),
            clinical_trials: filter_titles(drug, clinical_trials)
                .into_iter()
                .map(Mention::from)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pubmed.is_empty() && self.clinical_trials.is_empty()
    }
}

/// Drug name → mentions per corpus, in reference-list order
///
/// Equality compares entries regardless of order; compare `iter()` output
/// when order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionGraph {
    drugs: IndexMap<String, DrugMentions>,
}

impl MentionGraph {
    pub fn get(&self, drug: &str) -> Option<&DrugMentions> {
        self.drugs.get(drug)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DrugMentions)> {
        self.drugs.iter().map(|(name, mentions)| (name.as_str(), mentions))
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }

    /// Number of drugs found in neither corpus
    pub fn unmentioned_count(&self) -> usize {
        self.drugs.values().filter(|m| m.is_empty()).count()
    }
}

impl FromIterator<(String, DrugMentions)> for MentionGraph {
    /// A repeated drug name keeps its first position and its last entry.
    fn from_iter<I: IntoIterator<Item = (String, DrugMentions)>>(iter: I) -> Self {
        Self {
            drugs: iter.into_iter().collect(),
        }
    }
}

/// Build the mention graph sequentially
///
/// # Arguments
///
/// * `drugs` - Reference drug list, in the order the graph keys should follow
/// * `pubmed` - Publication rows, matched on `title`
/// * `clinical_trials` - Trial rows, matched on their scientific title
///
/// # Returns
///
/// One entry per drug name, empty lists included
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use drugmentions::{build, Drug, TitleRecord};
///
/// let drugs = vec![Drug::new("N02BE01", "doliprane")];
/// let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let pubmed = vec![TitleRecord::new("1", "Hello Doliprane for sale", "J1", date)];
///
/// let graph = build(&drugs, &pubmed, &[]);
/// assert_eq!(graph.get("doliprane").unwrap().pubmed.len(), 1);
/// ```
pub fn build(drugs: &[Drug], pubmed: &[TitleRecord], clinical_trials: &[TitleRecord]) -> MentionGraph {
    drugs
        .iter()
        .map(|drug| {
            (
                drug.name.clone(),
                DrugMentions::collect(&drug.name, pubmed, clinical_trials),
            )
        })
        .collect()
}

/// Build the mention graph with drugs sharded over the Rayon pool
///
/// Matching is pure, so each drug is scanned independently; results are
/// collected back in reference-list order.
pub fn build_parallel(
    drugs: &[Drug],
    pubmed: &[TitleRecord],
    clinical_trials: &[TitleRecord],
) -> MentionGraph {
    let entries: Vec<(String, DrugMentions)> = drugs
        .par_iter()
        .map(|drug| {
            (
                drug.name.clone(),
                DrugMentions::collect(&drug.name, pubmed, clinical_trials),
            )
        })
        .collect();

    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::to_document;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_corpora() -> (Vec<Drug>, Vec<TitleRecord>, Vec<TitleRecord>) {
        let drugs = vec![
            Drug::new("A04AD", "DIPHENHYDRAMINE"),
            Drug::new("S03AA", "TETRACYCLINE"),
            Drug::new("V03AB", "ETHANOL"),
            Drug::new("A03BA", "ATROPINE"),
        ];
        let pubmed = vec![
            TitleRecord::new("1", "A 44-year-old man with erythema of the face diphenhydramine", "Journal of emergency nursing", ymd(2019, 1, 1)),
            TitleRecord::new("2", "Tetracycline Resistance Patterns", "Psychopharmacology", ymd(2020, 1, 2)),
            TitleRecord::new("3", "Diphenhydramine and tetracycline interactions", "The journal of maternal-fetal & neonatal medicine", ymd(2020, 3, 1)),
        ];
        let trials = vec![
            TitleRecord::new("NCT01", "Use of Diphenhydramine as an Adjunctive Sedative", "Journal of emergency nursing", ymd(2020, 1, 1)),
            TitleRecord::new("NCT02", "Ethanol lock therapy", "Journal of emergency nursing", ymd(2020, 5, 25)),
        ];
        (drugs, pubmed, trials)
    }

    #[test]
    fn test_build_single_drug_document() {
        let drugs = vec![Drug::new("N02BE01", "doliprane")];
        let pubmed = vec![TitleRecord::new("1", "Hello Doliprane for sale", "J1", ymd(2020, 1, 1))];

        let graph = build(&drugs, &pubmed, &[]);

        assert_eq!(
            to_document(&graph).unwrap(),
            json!({
                "doliprane": {
                    "pubmed": [{ "journal": "J1", "date": "2020-01-01" }],
                    "clinicalTrials": []
                }
            })
        );
    }

    #[test]
    fn test_build_keeps_reference_order_and_row_order() {
        let (drugs, pubmed, trials) = sample_corpora();
        let graph = build(&drugs, &pubmed, &trials);

        let names: Vec<&str> = graph.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["DIPHENHYDRAMINE", "TETRACYCLINE", "ETHANOL", "ATROPINE"]);

        let diphenhydramine = graph.get("DIPHENHYDRAMINE").unwrap();
        let dates: Vec<NaiveDate> = diphenhydramine.pubmed.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![ymd(2019, 1, 1), ymd(2020, 3, 1)]);
        assert_eq!(diphenhydramine.clinical_trials.len(), 1);
    }

    #[test]
    fn test_build_keeps_unmentioned_drugs() {
        let (drugs, pubmed, trials) = sample_corpora();
        let graph = build(&drugs, &pubmed, &trials);

        let atropine = graph.get("ATROPINE").unwrap();
        assert!(atropine.pubmed.is_empty());
        assert!(atropine.clinical_trials.is_empty());
        assert_eq!(graph.unmentioned_count(), 1);
    }

    #[test]
    fn test_build_empty_reference_list() {
        let (_, pubmed, trials) = sample_corpora();
        assert!(build(&[], &pubmed, &trials).is_empty());
    }

    #[test]
    fn test_build_parallel_matches_sequential() {
        let (drugs, pubmed, trials) = sample_corpora();

        let sequential = build(&drugs, &pubmed, &trials);
        let parallel = build_parallel(&drugs, &pubmed, &trials);

        let sequential: Vec<_> = sequential.iter().collect();
        let parallel: Vec<_> = parallel.iter().collect();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_repeated_drug_keeps_first_position() {
        let pubmed = vec![TitleRecord::new("1", "Ethanol study", "J1", ymd(2020, 1, 1))];
        let drugs = vec![
            Drug::new("V03AB", "ETHANOL"),
            Drug::new("A03BA", "ATROPINE"),
            Drug::new("V03AZ", "ETHANOL"),
        ];

        let graph = build(&drugs, &pubmed, &[]);

        let names: Vec<&str> = graph.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["ETHANOL", "ATROPINE"]);
        assert_eq!(graph.get("ETHANOL").unwrap().pubmed.len(), 1);
    }
}
