//! Progress checkpoints for a harvest run
//!
//! The pipeline never logs progress directly. It reports to a
//! [`HarvestObserver`] at fixed checkpoints, and [`TracingObserver`] turns
//! those into `tracing` events.

use crate::extract::Record;
use crate::state::{RunState, SkippedItem, StopReason};

/// Receives progress notifications from the harvest pipeline
///
/// Every method has an empty default so observers only implement the
/// checkpoints they care about.
pub trait HarvestObserver: Send {
    /// A convergence iteration measured the listing count
    fn iteration_measured(&mut self, _state: &RunState, _target: usize) {}

    /// The convergence loop stopped
    fn discovery_stopped(&mut self, _state: &RunState, _reason: StopReason) {}

    /// Candidate identifiers were collected from the feed
    fn candidates_collected(&mut self, _found: usize, _target: usize) {}

    /// A record was extracted for the candidate at `position` (1-based) of `total`
    fn item_extracted(&mut self, _position: usize, _total: usize, _record: &Record) {}

    /// A candidate produced no record
    fn item_skipped(&mut self, _total: usize, _item: &SkippedItem) {}

    /// The detail crawl finished
    fn run_complete(&mut self, _records: usize, _candidates: usize, _skipped: usize) {}
}

/// Observer that logs every checkpoint through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HarvestObserver for TracingObserver {
    fn iteration_measured(&mut self, state: &RunState, target: usize) {
        tracing::info!(
            "Iteration {}: {} listings loaded (target {}, stalls {})",
            state.iteration,
            state.current,
            target,
            state.stalls
        );
    }

    fn discovery_stopped(&mut self, state: &RunState, reason: StopReason) {
        match reason {
            StopReason::TargetReached => tracing::info!(
                "Target reached after {} iterations with {} listings",
                state.iteration,
                state.current
            ),
            StopReason::Stalled => tracing::info!(
                "Feed stopped growing after {} iterations; continuing with {} listings",
                state.iteration,
                state.current
            ),
        }
    }

    fn candidates_collected(&mut self, found: usize, target: usize) {
        if found < target {
            tracing::warn!("Collected {} of {} requested candidates", found, target);
        } else {
            tracing::info!("Collected {} candidates", found);
        }
    }

    fn item_extracted(&mut self, position: usize, total: usize, record: &Record) {
        tracing::info!("[{}/{}] Extracted {}", position, total, record.name());
    }

    fn item_skipped(&mut self, total: usize, item: &SkippedItem) {
        tracing::warn!(
            "[{}/{}] Skipped {}: {}",
            item.position,
            total,
            item.candidate,
            item.reason
        );
    }

    fn run_complete(&mut self, records: usize, candidates: usize, skipped: usize) {
        tracing::info!(
            "Detail crawl complete: {} records from {} candidates ({} skipped)",
            records,
            candidates,
            skipped
        );
    }
}
