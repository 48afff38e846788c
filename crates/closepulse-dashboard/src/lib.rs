//! Call review dashboard for ClosePulse
//!
//! Provides the call dataset, free-text filtering, the active-call
//! selection, the pattern panel and the gate that decides whether the
//! dashboard renders at all.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod filter;
pub mod gate;
pub mod patterns;
pub mod repository;
pub mod selection;
pub mod view;

pub use filter::{FilterQuery, filter};
pub use gate::{GateDecision, NavigationPlan, Navigator, ViewGate};
pub use patterns::{DatasetPatterns, PatternAggregator, SnapshotPatterns, aggregator_from_config};
pub use repository::{CallRepository, InMemoryCallRepository};
pub use selection::SelectionController;
pub use view::{CallDetail, DashboardView};
