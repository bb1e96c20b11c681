//! Reconciliation of identity groups with GitHub teams.
//!
//! - [`types`] - `ReconcileOptions`, `ReconcileReport`, per-group outcomes
//! - [`progress`] - `ReconcileProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - `Reconciler`, the sequential per-group state machine

pub mod engine;
mod progress;
mod types;

pub use engine::Reconciler;
pub use progress::{ProgressCallback, ReconcileProgress, emit};
pub use types::{
    GroupFailure, GroupOutcome, ReconcileOptions, ReconcileReport, team_description,
};
