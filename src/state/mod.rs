// src/state/mod.rs

//! Durable run state.
//!
//! - [`run_state`] holds the `RunState` record and its transitions
//!   (admit, complete, reset).
//! - [`store`] provides the `StateStore` trait, the JSON-file store used in
//!   production and an in-memory store for tests.
//! - [`reconcile`] records tasks whose completion check already holds.

pub mod reconcile;
pub mod run_state;
pub mod store;

pub use reconcile::reconcile_completions;
pub use run_state::RunState;
pub use store::{JsonStateStore, MemoryStateStore, StateStore, StateSummary};
