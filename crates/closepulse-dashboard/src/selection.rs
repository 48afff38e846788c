//! Active call tracking
//!
//! Selection is deliberately independent of the filter: narrowing the list
//! never clears or moves it, and the detail panel keeps showing the last
//! selected record until another one is picked.

use closepulse_core::{CallId, CallRecord};
use tracing::debug;

/// Holds the call shown in the detail panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    current: Option<CallRecord>,
}

impl SelectionController {
    /// Select the first record of the unfiltered dataset, if any
    pub fn initial(records: &[CallRecord]) -> Self {
        Self {
            current: records.first().cloned(),
        }
    }

    /// Replace the selection unconditionally
    pub fn select(&mut self, record: &CallRecord) {
        debug!(call_id = %record.id, "Selected call");
        self.current = Some(record.clone());
    }

    /// Active record
    pub const fn current(&self) -> Option<&CallRecord> {
        self.current.as_ref()
    }

    /// Id of the active record
    pub fn current_id(&self) -> Option<CallId> {
        self.current.as_ref().map(|record| record.id)
    }

    /// Whether `id` is the active record
    pub fn is_selected(&self, id: CallId) -> bool {
        self.current_id() == Some(id)
    }
}
