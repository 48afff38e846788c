//! Dashboard view state
//!
//! Ties the dataset, the search query, the selection and the pattern source
//! together the way the dashboard page uses them.

use crate::filter::FilterQuery;
use crate::patterns::{PatternAggregator, SnapshotPatterns, aggregator_from_config};
use crate::repository::{CallRepository, InMemoryCallRepository};
use crate::selection::SelectionController;
use closepulse_core::{CallId, CallRecord, Error, PatternGroup, Result, config::DatasetConfig};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Selected call with the text the detail panel derives from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallDetail<'a> {
    /// The call
    #[serde(flatten)]
    pub record: &'a CallRecord,
    /// Heading above the outcome explanation, e.g. "Why Won?"
    pub outcome_heading: String,
    /// Sentence describing the sentiment
    pub sentiment_summary: String,
}

impl<'a> CallDetail<'a> {
    /// Project `record` for display
    pub fn new(record: &'a CallRecord) -> Self {
        Self {
            record,
            outcome_heading: format!("Why {}?", record.outcome),
            sentiment_summary: record.sentiment.summary(),
        }
    }
}

/// State behind the dashboard page
pub struct DashboardView {
    repository: Arc<dyn CallRepository>,
    aggregator: Arc<dyn PatternAggregator>,
    query: FilterQuery,
    selection: SelectionController,
}

impl std::fmt::Debug for DashboardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardView")
            .field("calls", &self.repository.len())
            .field("patterns", &self.aggregator.name())
            .field("query", &self.query.as_str())
            .field("selected", &self.selection.current_id())
            .finish()
    }
}

impl DashboardView {
    /// View over `repository` with the first call selected and no query
    pub fn new(
        repository: Arc<dyn CallRepository>,
        aggregator: Arc<dyn PatternAggregator>,
    ) -> Self {
        let selection = SelectionController::initial(repository.all());
        Self {
            repository,
            aggregator,
            query: FilterQuery::default(),
            selection,
        }
    }

    /// View over the bundled sample calls and pattern snapshot
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled data is malformed.
    pub fn sample() -> Result<Self> {
        Ok(Self::new(
            Arc::new(InMemoryCallRepository::sample()?),
            Arc::new(SnapshotPatterns::sample()?),
        ))
    }

    /// View over the configured dataset and pattern source
    ///
    /// # Errors
    ///
    /// Returns an error if a configured data file cannot be loaded.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        let repository = InMemoryCallRepository::from_config(config)?;
        let aggregator: Arc<dyn PatternAggregator> = Arc::from(aggregator_from_config(config)?);
        Ok(Self::new(Arc::new(repository), aggregator))
    }

    /// Replace the search query
    pub fn set_query(&mut self, query: impl Into<FilterQuery>) {
        self.query = query.into();
        debug!(query = self.query.as_str(), "Query changed");
    }

    /// Current search query
    pub const fn query(&self) -> &FilterQuery {
        &self.query
    }

    /// Every call, unfiltered
    pub fn all(&self) -> &[CallRecord] {
        self.repository.all()
    }

    /// Calls matching the current query, in dataset order
    pub fn visible(&self) -> Vec<&CallRecord> {
        self.query.apply(self.repository.all())
    }

    /// Make `record` the active call
    pub fn select(&mut self, record: &CallRecord) {
        self.selection.select(record);
    }

    /// Make the call with `id` active, whether or not it is visible
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no call has this id.
    pub fn select_id(&mut self, id: CallId) -> Result<()> {
        let record = self
            .repository
            .get(id)
            .ok_or_else(|| Error::not_found(format!("call {id}")))?;
        self.selection.select(record);
        Ok(())
    }

    /// Active call
    pub const fn current(&self) -> Option<&CallRecord> {
        self.selection.current()
    }

    /// Whether the row for `id` is highlighted
    pub fn is_selected(&self, id: CallId) -> bool {
        self.selection.is_selected(id)
    }

    /// Detail panel content for the active call
    pub fn detail(&self) -> Option<CallDetail<'_>> {
        self.current().map(CallDetail::new)
    }

    /// Pattern panel groups
    pub fn patterns(&self) -> Vec<PatternGroup> {
        self.aggregator.patterns(self.repository.all())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::patterns::DatasetPatterns;
    use pretty_assertions::assert_eq;

    fn visible_ids(view: &DashboardView) -> Vec<u32> {
        view.visible().iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn test_initial_view() {
        let view = DashboardView::sample().unwrap();
        assert_eq!(visible_ids(&view), vec![1, 2, 3, 4, 5]);
        assert_eq!(view.current().map(|r| r.id), Some(CallId(1)));
        assert!(view.is_selected(CallId(1)));
        assert!(view.query().is_empty());
        assert_eq!(view.all().len(), 5);
    }

    #[test]
    fn test_query_refilters_without_touching_selection() {
        let mut view = DashboardView::sample().unwrap();

        view.set_query("PRICING");
        assert_eq!(visible_ids(&view), vec![1, 2, 5]);

        view.set_query("wilson");
        assert_eq!(visible_ids(&view), vec![3]);
        assert_eq!(view.current().map(|r| r.id), Some(CallId(1)));
        assert!(!view.visible().iter().any(|r| view.is_selected(r.id)));

        view.set_query("");
        assert_eq!(visible_ids(&view), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_select_id() {
        let mut view = DashboardView::sample().unwrap();
        view.set_query("acme");

        view.select_id(CallId(4)).unwrap();
        assert_eq!(view.current().map(|r| r.customer.as_str()), Some("Innovate LLC"));

        let err = view.select_id(CallId(99)).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(view.current().map(|r| r.id), Some(CallId(4)));
    }

    #[test]
    fn test_detail_projection() {
        let mut view = DashboardView::sample().unwrap();

        let detail = view.detail().unwrap();
        assert_eq!(detail.outcome_heading, "Why Won?");
        assert_eq!(
            detail.sentiment_summary,
            "This call had an overall positive sentiment, indicating a favorable customer reaction."
        );

        view.select_id(CallId(3)).unwrap();
        let detail = view.detail().unwrap();
        assert_eq!(detail.outcome_heading, "Why Lost?");
        assert_eq!(
            detail.sentiment_summary,
            "This call had an overall negative sentiment, indicating potential concerns or dissatisfaction."
        );
    }

    #[test]
    fn test_detail_serializes_flat() {
        let view = DashboardView::sample().unwrap();
        let json = serde_json::to_value(view.detail().unwrap()).unwrap();
        assert_eq!(json["customer"], "Acme Corp");
        assert_eq!(json["outcome_heading"], "Why Won?");
    }

    #[test]
    fn test_empty_dataset_has_no_detail() {
        let view = DashboardView::new(
            Arc::new(InMemoryCallRepository::default()),
            Arc::new(DatasetPatterns),
        );
        assert!(view.current().is_none());
        assert!(view.detail().is_none());
        assert!(view.visible().is_empty());
        assert_eq!(view.patterns().len(), 3);
    }

    #[test]
    fn test_patterns_follow_source() {
        let snapshot = DashboardView::sample().unwrap();
        assert_eq!(snapshot.patterns()[0].title, "Success Factors");

        let live = DashboardView::from_config(&DatasetConfig {
            live_patterns: true,
            ..DatasetConfig::default()
        })
        .unwrap();
        assert_eq!(live.patterns()[0].title, "Outcome Mix");
    }
}
