//! Case-insensitive substring matching of drug names in titles.
//!
//! The drug name is a literal: no trimming, no tokenization, no pattern
//! syntax. A name that is part of a longer word still matches ("pan" is
//! found in "Panadol").

use drugscraper::TitleRecord;

/// True when `drug` occurs in `title`, ignoring letter case
pub fn matches(drug: &str, title: &str) -> bool {
    title.to_lowercase().contains(&drug.to_lowercase())
}

/// Rows whose title mentions `drug`, in their original order
pub fn filter_titles<'a>(drug: &str, titles: &'a [TitleRecord]) -> Vec<&'a TitleRecord> {
    let needle = drug.to_lowercase();
    titles
        .iter()
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .collect()
}
