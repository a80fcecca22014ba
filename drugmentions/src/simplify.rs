//! Flattening of the mention graph into one tagged list per drug.

use crate::document::iso_date;
use crate::graph::{Mention, MentionGraph};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Corpus a mention came from
///
/// Both the flattening step and the provenance queries use this one
/// enumeration. The lower-case `"pubmed"` spelling found in older documents
/// parses as [`Source::PubMed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "pubMed", alias = "pubmed")]
    PubMed,

    #[serde(rename = "clinicalTrials")]
    ClinicalTrials,
}

/// A mention stamped with its corpus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimplifiedMention {
    pub journal: String,

    #[serde(with = "iso_date")]
    pub date: NaiveDate,

    pub source: Source,
}

impl SimplifiedMention {
    pub fn new(journal: impl Into<String>, date: NaiveDate, source: Source) -> Self {
        Self {
            journal: journal.into(),
            date,
            source,
        }
    }

    fn tagged(mention: &Mention, source: Source) -> Self {
        Self {
            journal: mention.journal.clone(),
            date: mention.date,
            source,
        }
    }
}

/// Drug name → flat list of tagged mentions, in reference-list order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimplifiedGraph {
    drugs: IndexMap<String, Vec<SimplifiedMention>>,
}

impl SimplifiedGraph {
    pub fn get(&self, drug: &str) -> Option<&[SimplifiedMention]> {
        self.drugs.get(drug).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SimplifiedMention])> {
        self.drugs
            .iter()
            .map(|(name, mentions)| (name.as_str(), mentions.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.drugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drugs.is_empty()
    }
}

impl FromIterator<(String, Vec<SimplifiedMention>)> for SimplifiedGraph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<SimplifiedMention>)>>(iter: I) -> Self {
        Self {
            drugs: iter.into_iter().collect(),
        }
    }
}

/// Flatten a mention graph
///
/// Each drug gets its publication mentions tagged [`Source::PubMed`]
/// followed by its trial mentions tagged [`Source::ClinicalTrials`], both in
/// the order received. Nothing is filtered, deduplicated or sorted, and
/// drugs without mentions keep an empty list.
pub fn simplify(graph: &MentionGraph) -> SimplifiedGraph {
    graph
        .iter()
        .map(|(drug, mentions)| {
            let flat = mentions
                .pubmed
                .iter()
                .map(|m| SimplifiedMention::tagged(m, Source::PubMed))
                .chain(
                    mentions
                        .clinical_trials
                        .iter()
                        .map(|m| SimplifiedMention::tagged(m, Source::ClinicalTrials)),
                )
                .collect();
            (drug.to_string(), flat)
        })
        .collect()
}
