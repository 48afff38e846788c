//! Pattern panel aggregation
//!
//! Two sources produce the same shape: [`SnapshotPatterns`] serves authored
//! groups as they were written, [`DatasetPatterns`] derives groups from the
//! calls themselves. Both are pure over their input.

use closepulse_core::utils::percentage;
use closepulse_core::{
    CallRecord, Outcome, PatternGroup, PatternItem, Result, Sentiment, config::DatasetConfig,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use validator::Validate;

const SAMPLE_PATTERNS: &str = include_str!("../data/patterns.json");

/// Number of topics listed in the "Top Topics" group
pub const TOP_TOPICS: usize = 3;

/// Source of the pattern panel
pub trait PatternAggregator: Send + Sync {
    /// Groups for `records`, in display order
    fn patterns(&self, records: &[CallRecord]) -> Vec<PatternGroup>;

    /// Source name for logs
    fn name(&self) -> &'static str;
}

/// Authored groups, independent of the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPatterns {
    groups: Vec<PatternGroup>,
}

impl SnapshotPatterns {
    /// Wrap authored groups
    ///
    /// # Errors
    ///
    /// Returns a validation error for an untitled group, an empty item text or
    /// a percentage above 100.
    pub fn new(groups: Vec<PatternGroup>) -> Result<Self> {
        for group in &groups {
            group.validate()?;
        }
        Ok(Self { groups })
    }

    /// Parse a JSON array of groups
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a group is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a JSON array of groups from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let snapshot = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), groups = snapshot.groups.len(), "Loaded pattern snapshot");
        Ok(snapshot)
    }

    /// The bundled three-group snapshot
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled data is malformed.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_PATTERNS)
    }

    /// Authored groups
    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }
}

impl PatternAggregator for SnapshotPatterns {
    fn patterns(&self, _records: &[CallRecord]) -> Vec<PatternGroup> {
        self.groups.clone()
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}

/// Groups computed from the calls
///
/// Produces "Outcome Mix", "Sentiment Mix" and "Top Topics". Percentages are
/// shares of all calls, rounded half up. Items run from the largest share
/// down; equal shares keep first-seen order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetPatterns;

impl DatasetPatterns {
    fn outcome_mix(records: &[CallRecord]) -> PatternGroup {
        let counts = Outcome::ALL.map(|outcome| {
            let count = records.iter().filter(|r| r.outcome == outcome).count();
            (outcome.to_string(), count)
        });
        PatternGroup {
            id: 1,
            title: "Outcome Mix".to_string(),
            description: "How reviewed calls ended".to_string(),
            items: ranked(Vec::from(counts), records.len()),
        }
    }

    fn sentiment_mix(records: &[CallRecord]) -> PatternGroup {
        let counts = Sentiment::ALL.map(|sentiment| {
            let count = records.iter().filter(|r| r.sentiment == sentiment).count();
            (sentiment.to_string(), count)
        });
        PatternGroup {
            id: 2,
            title: "Sentiment Mix".to_string(),
            description: "Overall customer reaction across calls".to_string(),
            items: ranked(Vec::from(counts), records.len()),
        }
    }

    fn top_topics(records: &[CallRecord]) -> PatternGroup {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in records {
            let mut seen = HashSet::new();
            for topic in &record.topics {
                if !seen.insert(topic.as_str()) {
                    continue;
                }
                match counts.iter_mut().find(|(name, _)| name == topic) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((topic.clone(), 1)),
                }
            }
        }

        let mut items = ranked(counts, records.len());
        items.truncate(TOP_TOPICS);
        PatternGroup {
            id: 3,
            title: "Top Topics".to_string(),
            description: "Subjects raised most often".to_string(),
            items,
        }
    }
}

/// Turn `(label, count)` pairs into items sorted by descending share
fn ranked(counts: Vec<(String, usize)>, total: usize) -> Vec<PatternItem> {
    let mut counts = counts;
    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(label, count)| {
            let noun = if total == 1 { "call" } else { "calls" };
            PatternItem::new(
                format!("{label} ({count} of {total} {noun})"),
                percentage(count, total),
            )
        })
        .collect()
}

impl PatternAggregator for DatasetPatterns {
    fn patterns(&self, records: &[CallRecord]) -> Vec<PatternGroup> {
        vec![
            Self::outcome_mix(records),
            Self::sentiment_mix(records),
            Self::top_topics(records),
        ]
    }

    fn name(&self) -> &'static str {
        "dataset"
    }
}

/// Pattern source selected by configuration
///
/// `live_patterns` wins over `patterns_path`; with neither set the bundled
/// snapshot is used.
///
/// # Errors
///
/// Returns an error if the configured snapshot file cannot be loaded.
pub fn aggregator_from_config(config: &DatasetConfig) -> Result<Box<dyn PatternAggregator>> {
    if config.live_patterns {
        return Ok(Box::new(DatasetPatterns));
    }
    let snapshot = match &config.patterns_path {
        Some(path) => SnapshotPatterns::from_json_file(path)?,
        None => SnapshotPatterns::sample()?,
    };
    Ok(Box::new(snapshot))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::repository::{CallRepository, InMemoryCallRepository};
    use closepulse_core::{CallId, Error, ProgressTone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sample() -> Vec<CallRecord> {
        InMemoryCallRepository::sample().unwrap().all().to_vec()
    }

    fn items(group: &PatternGroup) -> Vec<(&str, u8)> {
        group
            .items
            .iter()
            .map(|item| (item.text.as_str(), item.percentage))
            .collect()
    }

    #[test]
    fn test_snapshot_sample_as_authored() {
        let groups = SnapshotPatterns::sample().unwrap().patterns(&[]);
        let titles: Vec<_> = groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Success Factors", "Common Objections", "Improvement Areas"]
        );

        // Authored order is kept even where shares are not descending
        let percentages: Vec<_> = groups[0].items.iter().map(|i| i.percentage).collect();
        assert_eq!(percentages, vec![80, 75, 90]);
        assert_eq!(groups[1].description, "Frequently encountered customer concerns");
        assert_eq!(groups[2].items[2].tone(), ProgressTone::Weak);
    }

    #[test]
    fn test_snapshot_ignores_dataset() {
        let snapshot = SnapshotPatterns::sample().unwrap();
        assert_eq!(snapshot.patterns(&sample()), snapshot.patterns(&[]));
        assert_eq!(snapshot.groups().len(), 3);
    }

    #[test]
    fn test_snapshot_rejects_out_of_range_percentage() {
        let json = r#"[{"id":1,"title":"T","description":"","items":[{"text":"x","percentage":120}]}]"#;
        let err = SnapshotPatterns::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_dataset_patterns_on_sample() {
        let groups = DatasetPatterns.patterns(&sample());

        assert_eq!(groups[0].title, "Outcome Mix");
        assert_eq!(
            items(&groups[0]),
            vec![
                ("Won (2 of 5 calls)", 40),
                ("Pending (2 of 5 calls)", 40),
                ("Lost (1 of 5 calls)", 20),
            ]
        );

        assert_eq!(groups[1].title, "Sentiment Mix");
        assert_eq!(
            items(&groups[1]),
            vec![
                ("Positive (2 of 5 calls)", 40),
                ("Neutral (2 of 5 calls)", 40),
                ("Negative (1 of 5 calls)", 20),
            ]
        );

        assert_eq!(groups[2].title, "Top Topics");
        assert_eq!(
            items(&groups[2]),
            vec![
                ("pricing (3 of 5 calls)", 60),
                ("features (2 of 5 calls)", 40),
                ("support (2 of 5 calls)", 40),
            ]
        );
    }

    #[test]
    fn test_dataset_patterns_on_empty_dataset() {
        let groups = DatasetPatterns.patterns(&[]);
        assert_eq!(groups.len(), 3);
        assert!(groups[0].items.iter().all(|item| item.percentage == 0));
        assert!(groups[2].items.is_empty());
    }

    #[test]
    fn test_repeated_topic_counts_once_per_call() {
        let mut record = sample().swap_remove(0);
        record.id = CallId(10);
        record.topics = vec!["pricing".into(), "pricing".into()];

        let groups = DatasetPatterns.patterns(&[record]);
        assert_eq!(items(&groups[2]), vec![("pricing (1 of 1 call)", 100)]);
    }

    #[test]
    fn test_aggregator_from_config() {
        let live = DatasetConfig {
            live_patterns: true,
            ..DatasetConfig::default()
        };
        assert_eq!(aggregator_from_config(&live).unwrap().name(), "dataset");
        assert_eq!(
            aggregator_from_config(&DatasetConfig::default()).unwrap().name(),
            "snapshot"
        );
    }

    proptest! {
        #[test]
        fn prop_dataset_patterns_are_pure_and_bounded(
            picks in prop::collection::vec(0usize..5, 0..20),
        ) {
            let base = sample();
            let records: Vec<CallRecord> = picks
                .iter()
                .enumerate()
                .map(|(i, &pick)| {
                    let mut record = base[pick].clone();
                    record.id = CallId(u32::try_from(i).unwrap());
                    record
                })
                .collect();

            let first = DatasetPatterns.patterns(&records);
            prop_assert_eq!(&first, &DatasetPatterns.patterns(&records));

            for group in &first {
                prop_assert!(group.items.iter().all(|item| item.percentage <= 100));
                prop_assert!(group
                    .items
                    .windows(2)
                    .all(|pair| pair[0].percentage >= pair[1].percentage));
            }
        }
    }
}
