//! List-view filtering over [`FileMetadata`].

use crate::types::FileMetadata;
use chrono::{DateTime, NaiveDate};

/// Criteria for narrowing the library listing. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    /// Every term must occur in the display name (case-sensitive)
    pub name_terms: Vec<String>,
    /// Inclusive lower bound, UTC calendar date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound, UTC calendar date
    pub to: Option<NaiveDate>,
    /// Required tag, exact match
    pub tag: Option<String>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `query` on whitespace into name terms.
    pub fn with_name(mut self, query: &str) -> Self {
        self.name_terms = query.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name_terms.is_empty() && self.from.is_none() && self.to.is_none() && self.tag.is_none()
    }

    pub fn matches(&self, metadata: &FileMetadata) -> bool {
        let name_ok = self
            .name_terms
            .iter()
            .all(|term| metadata.display_name.contains(term.as_str()));
        if !name_ok {
            return false;
        }

        if let Some(tag) = &self.tag {
            if !metadata.tags.iter().any(|t| t == tag) {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            // An unset date is the epoch, so any lower bound after 1970 excludes it.
            let Some(date) = DateTime::from_timestamp_millis(metadata.date) else {
                return false;
            };
            let date = date.date_naive();
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        true
    }

    /// Entries of `items` that match, in order.
    pub fn apply<'a, I>(&self, items: I) -> Vec<&'a FileMetadata>
    where
        I: IntoIterator<Item = &'a FileMetadata>,
    {
        items.into_iter().filter(|m| self.matches(m)).collect()
    }
}
