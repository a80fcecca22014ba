//! # Aggregates over the simplified graph
//!
//! Two read-only queries:
//!
//! - **Leading journal**: the journal mentioning the most distinct drugs,
//!   all corpora included. Ties go to the first journal reaching the maximum
//!   in graph iteration order (drug order, then mention order).
//! - **Single-provenance drugs**: drugs with at least one mention from a
//!   given corpus and none from any other.

use crate::error::{MentionError, Result};
use crate::simplify::{SimplifiedGraph, Source};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Persisted answer of the leading-journal query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopJournal {
    pub journal_with_most_drug_mentions: String,
}

/// Journal → distinct drugs it mentions, in first-seen order
pub fn drugs_per_journal(graph: &SimplifiedGraph) -> IndexMap<&str, IndexSet<&str>> {
    let mut journals: IndexMap<&str, IndexSet<&str>> = IndexMap::new();

    for (drug, mentions) in graph.iter() {
        for mention in mentions {
            journals
                .entry(mention.journal.as_str())
                .or_default()
                .insert(drug);
        }
    }

    journals
}

/// Journal mentioning the largest number of distinct drugs
///
/// # Errors
///
/// `MentionError::EmptyCorpus` when no drug has any mention.
pub fn journal_with_most_drug_mentions(graph: &SimplifiedGraph) -> Result<String> {
    let mut best: Option<(&str, usize)> = None;

    for (journal, drugs) in drugs_per_journal(graph) {
        // strict comparison keeps the first journal on ties
        if best.map_or(true, |(_, count)| drugs.len() > count) {
            best = Some((journal, drugs.len()));
        }
    }

    best.map(|(journal, _)| journal.to_string())
        .ok_or(MentionError::EmptyCorpus)
}

/// Drugs mentioned in `source` and in no other corpus, in graph order
pub fn drugs_only_in(graph: &SimplifiedGraph, source: Source) -> Vec<String> {
    let mut in_source: IndexSet<&str> = IndexSet::new();
    let mut elsewhere: HashSet<&str> = HashSet::new();

    for (drug, mentions) in graph.iter() {
        for mention in mentions {
            if mention.source == source {
                in_source.insert(drug);
            } else {
                elsewhere.insert(drug);
            }
        }
    }

    in_source
        .into_iter()
        .filter(|drug| !elsewhere.contains(drug))
        .map(str::to_string)
        .collect()
}

/// Drugs mentioned only in publications
pub fn drugs_only_pubmed(graph: &SimplifiedGraph) -> Vec<String> {
    drugs_only_in(graph, Source::PubMed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::simplify::{simplify, SimplifiedMention};
    use chrono::NaiveDate;
    use drugscraper::{Drug, TitleRecord};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    fn graph_of(entries: &[(&str, &[(&str, Source)])]) -> SimplifiedGraph {
        entries
            .iter()
            .map(|(drug, mentions)| {
                (
                    drug.to_string(),
                    mentions
                        .iter()
                        .map(|(journal, source)| SimplifiedMention::new(*journal, day(), *source))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_journal_with_most_distinct_drugs() {
        let graph = graph_of(&[
            ("doliprane", &[("J1", Source::PubMed)]),
            ("voltarin", &[("J1", Source::PubMed)]),
            ("fervex", &[("J2", Source::PubMed)]),
        ]);

        assert_eq!(journal_with_most_drug_mentions(&graph).unwrap(), "J1");
    }

    #[test]
    fn test_repeated_mentions_count_once() {
        let graph = graph_of(&[
            ("doliprane", &[("J2", Source::PubMed), ("J2", Source::ClinicalTrials), ("J2", Source::PubMed)]),
            ("voltarin", &[("J1", Source::PubMed)]),
            ("fervex", &[("J1", Source::ClinicalTrials)]),
        ]);

        assert_eq!(journal_with_most_drug_mentions(&graph).unwrap(), "J1");
    }

    #[test]
    fn test_tie_goes_to_first_seen_journal() {
        let graph = graph_of(&[
            ("doliprane", &[("J2", Source::PubMed), ("J1", Source::PubMed)]),
            ("voltarin", &[("J1", Source::PubMed), ("J2", Source::ClinicalTrials)]),
        ]);

        assert_eq!(journal_with_most_drug_mentions(&graph).unwrap(), "J2");
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let no_drugs = SimplifiedGraph::default();
        assert!(matches!(
            journal_with_most_drug_mentions(&no_drugs),
            Err(MentionError::EmptyCorpus)
        ));

        let no_mentions = graph_of(&[("doliprane", &[])]);
        assert!(matches!(
            journal_with_most_drug_mentions(&no_mentions),
            Err(MentionError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_drugs_per_journal() {
        let graph = graph_of(&[
            ("doliprane", &[("J1", Source::PubMed), ("J2", Source::ClinicalTrials)]),
            ("voltarin", &[("J1", Source::PubMed)]),
        ]);

        let journals = drugs_per_journal(&graph);
        let counts: Vec<(&str, usize)> = journals.iter().map(|(j, d)| (*j, d.len())).collect();
        assert_eq!(counts, vec![("J1", 2), ("J2", 1)]);
    }

    #[test]
    fn test_drugs_only_pubmed() {
        // older documents spell the publication tag "pubmed"
        let graph: SimplifiedGraph = serde_json::from_str(
            r#"{
                "doliprane": [{ "journal": "journal med", "date": "2020-01-01", "source": "pubmed" }],
                "voltarin": [{ "journal": "journal med", "date": "2020-01-01", "source": "pubmed" }],
                "fervex": [{ "journal": "journal science", "date": "2020-01-01", "source": "pubmed" }],
                "paraceta": [{ "journal": "journal science", "date": "2020-01-01", "source": "clinicalTrials" }],
                "aspigique": [{ "journal": "journal med", "date": "2020-01-01", "source": "clinicalTrials" }]
            }"#,
        )
        .unwrap();

        assert_eq!(drugs_only_pubmed(&graph), vec!["doliprane", "voltarin", "fervex"]);
    }

    #[test]
    fn test_drug_in_both_corpora_is_excluded() {
        let graph = graph_of(&[
            ("doliprane", &[("J1", Source::PubMed), ("J2", Source::ClinicalTrials)]),
            ("voltarin", &[("J1", Source::PubMed)]),
            ("fervex", &[]),
        ]);

        assert_eq!(drugs_only_in(&graph, Source::PubMed), vec!["voltarin"]);
        assert!(drugs_only_in(&graph, Source::ClinicalTrials).is_empty());
    }

    #[test]
    fn test_only_pubmed_on_simplifier_output_is_not_empty() {
        let drugs = vec![Drug::new("A", "doliprane"), Drug::new("B", "fervex")];
        let pubmed = vec![TitleRecord::new("1", "Doliprane in children", "J1", day())];
        let trials = vec![TitleRecord::new("NCT1", "Fervex trial", "J2", day())];

        let simplified = simplify(&build(&drugs, &pubmed, &trials));

        assert_eq!(drugs_only_pubmed(&simplified), vec!["doliprane"]);
        assert_eq!(drugs_only_in(&simplified, Source::ClinicalTrials), vec!["fervex"]);
    }

    #[test]
    fn test_empty_graph_yields_no_single_provenance_drugs() {
        assert!(drugs_only_pubmed(&SimplifiedGraph::default()).is_empty());
    }
}
