//! Shared fixtures for session integration tests

#![allow(dead_code, unreachable_pub)]

use closepulse_session::{
    KeyValueStore, MemoryStore, SessionSettings, SessionStore, StaticCredentials,
};
use std::sync::Arc;

/// Accepted demo email
pub const DEMO_EMAIL: &str = "demo@closepulse.com";

/// Accepted demo password
pub const DEMO_PASSWORD: &str = "password";

/// Storage key used by default
pub const STORAGE_KEY: &str = "closepulse_user";

/// Store with no simulated latency over `storage`
pub fn immediate_store(storage: Arc<dyn KeyValueStore>) -> SessionStore {
    SessionStore::new(
        storage,
        Arc::new(StaticCredentials::default()),
        SessionSettings::immediate(),
    )
}

/// A fresh store over a clone of `storage`, modelling a process restart
pub fn restarted(storage: &MemoryStore) -> SessionStore {
    immediate_store(Arc::new(storage.clone()))
}
