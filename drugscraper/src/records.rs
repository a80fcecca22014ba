//! Cleaned records handed to the mention engine.

use chrono::NaiveDate;

/// A reference drug from the drug list
///
/// The drug `name` is the join key against every title corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Drug {
    /// ATC classification code
    pub atc_code: String,

    /// Drug name as written in the reference list
    pub name: String,
}

impl Drug {
    pub fn new(atc_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            atc_code: atc_code.into(),
            name: name.into(),
        }
    }
}

/// A cleaned row from the publication or the clinical trial corpus
///
/// Clinical trials carry their `scientific_title` column in `title`, so both
/// corpora share one shape once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleRecord {
    /// Source identifier (numeric for publications, registry id for trials)
    pub id: String,

    /// Title text searched for drug names
    pub title: String,

    /// Publication venue
    pub journal: String,

    /// Calendar date of the publication or trial
    pub date: NaiveDate,
}

impl TitleRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        journal: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            journal: journal.into(),
            date,
        }
    }
}
