//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `RunState`: convergence-loop counters, discarded when the loop exits
//! - `CandidateId` / `Catalog`: the identifiers collected from the feed and the
//!   records extracted from them
//! - `SkipReason`: why a candidate produced no record

mod catalog;
mod item_state;
mod run_state;

// Re-export main types
pub use catalog::{CandidateId, Catalog};
pub use item_state::{SkipReason, SkippedItem};
pub use run_state::{RunState, StopReason};
