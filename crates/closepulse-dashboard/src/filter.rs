//! Free-text call filtering
//!
//! A record matches when its customer, its agent or any of its topics
//! contains the query, ignoring case. The empty query matches everything.
//! Queries are used as typed; surrounding whitespace is part of the needle.

use closepulse_core::CallRecord;
use closepulse_core::utils::{contains_folded, fold_case};

/// A search query, case-folded once up front
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    raw: String,
    folded: String,
}

impl FilterQuery {
    /// Create a query from user input
    pub fn new(query: impl Into<String>) -> Self {
        let raw = query.into();
        let folded = fold_case(&raw);
        Self { raw, folded }
    }

    /// Query as typed
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this is the match-all query
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether `record` matches
    pub fn matches(&self, record: &CallRecord) -> bool {
        contains_folded(&record.customer, &self.folded)
            || contains_folded(&record.agent, &self.folded)
            || record
                .topics
                .iter()
                .any(|topic| contains_folded(topic, &self.folded))
    }

    /// Matching records in their original order
    pub fn apply<'a>(&self, records: &'a [CallRecord]) -> Vec<&'a CallRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

impl From<&str> for FilterQuery {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

impl From<String> for FilterQuery {
    fn from(query: String) -> Self {
        Self::new(query)
    }
}

/// Records whose customer, agent or any topic contains `query`, ignoring case
pub fn filter<'a>(records: &'a [CallRecord], query: &str) -> Vec<&'a CallRecord> {
    FilterQuery::new(query).apply(records)
}
