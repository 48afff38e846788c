//! Shared fixtures for dashboard integration tests

#![allow(dead_code, unreachable_pub, clippy::unwrap_used)]

use chrono::NaiveDate;
use closepulse_core::{CallId, CallRecord, Outcome, Sentiment};
use closepulse_dashboard::Navigator;
use closepulse_session::{MemoryStore, SessionSettings, SessionStore, StaticCredentials};
use parking_lot::Mutex;
use std::sync::Arc;

/// Minimal call with the given identity fields
pub fn call(id: u32, customer: &str, agent: &str, topics: &[&str]) -> CallRecord {
    CallRecord {
        id: CallId(id),
        date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        time: "9:00 AM".to_string(),
        duration_label: "10:00".to_string(),
        customer: customer.to_string(),
        agent: agent.to_string(),
        sentiment: Sentiment::Neutral,
        outcome: Outcome::Pending,
        topics: topics.iter().map(ToString::to_string).collect(),
        transcript: String::new(),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        why: String::new(),
    }
}

/// Session store over a fresh memory slot with no latency
pub fn session_store() -> SessionStore {
    SessionStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(StaticCredentials::default()),
        SessionSettings::immediate(),
    )
}

/// Navigator that records every route it is sent to
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Routes visited so far
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}
