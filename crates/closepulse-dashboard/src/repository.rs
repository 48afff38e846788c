//! Read-only call dataset
//!
//! Records keep their load order, most recent first by convention of the
//! data. Nothing here sorts or mutates them.

use closepulse_core::{CallId, CallRecord, Error, Result, config::DatasetConfig};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use validator::Validate;

const SAMPLE_CALLS: &str = include_str!("../data/sample_calls.json");

/// Read contract for a call data source
pub trait CallRepository: Send + Sync {
    /// Every record in load order
    fn all(&self) -> &[CallRecord];

    /// Record with `id`
    fn get(&self, id: CallId) -> Option<&CallRecord> {
        self.all().iter().find(|record| record.id == id)
    }

    /// Number of records
    fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether the dataset is empty
    fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}

/// Dataset held in memory, loaded once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCallRepository {
    records: Vec<CallRecord>,
}

impl InMemoryCallRepository {
    /// Build from records, checking ids are unique and each record is valid
    ///
    /// # Errors
    ///
    /// Returns a validation error for a duplicate id or an invalid record.
    pub fn new(records: Vec<CallRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(Error::validation(
                    "id",
                    format!("duplicate call id {}", record.id),
                ));
            }
            record.validate()?;
        }
        Ok(Self { records })
    }

    /// Parse a JSON array of records
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a record is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<CallRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Load a JSON array of records from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let repository = Self::from_json(&json)?;
        info!(path = %path.display(), calls = repository.records.len(), "Loaded call dataset");
        Ok(repository)
    }

    /// The bundled five-call sample dataset
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled data is malformed.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_CALLS)
    }

    /// Configured dataset, or the bundled sample when none is configured
    ///
    /// # Errors
    ///
    /// Returns an error if the configured file cannot be loaded.
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        match &config.calls_path {
            Some(path) => Self::from_json_file(path),
            None => Self::sample(),
        }
    }
}

impl CallRepository for InMemoryCallRepository {
    fn all(&self) -> &[CallRecord] {
        &self.records
    }
}
