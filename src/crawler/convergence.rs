//! Listing convergence loop
//!
//! Drives an infinite-scroll feed until enough listings are rendered or the
//! feed stops growing. Nothing is extracted here; the loop only counts.

use crate::browser::{BrowserSession, Locator, SessionResult};
use crate::config::CrawlerConfig;
use crate::crawler::HarvestObserver;
use crate::state::{RunState, StopReason};
use std::time::Duration;

/// Result of one discovery pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceOutcome {
    /// Listing count at the final measurement
    pub count: usize,

    /// Number of measurements taken
    pub iterations: u32,

    pub reason: StopReason,
}

/// Stopping policy for the feed
#[derive(Debug, Clone)]
pub struct ListingConvergence {
    target: usize,
    stall_limit: u32,
    settle: Duration,
    scroll_step: u32,
}

impl ListingConvergence {
    pub fn new(target: usize, stall_limit: u32, settle: Duration, scroll_step: u32) -> Self {
        Self {
            target,
            stall_limit,
            settle,
            scroll_step,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_results,
            config.stall_limit,
            config.settle_interval(),
            config.scroll_step,
        )
    }

    /// Scrolls the feed until the target is reached or growth stalls
    ///
    /// Each iteration measures the rendered anchors, records the count, and
    /// either stops or scrolls one step and waits the settle interval.
    /// Growth resets the stall counter; a non-growing measurement increments
    /// it. The loop stops after at most `stall_limit` consecutive non-growing
    /// measurements, so it always terminates.
    ///
    /// # Arguments
    ///
    /// * `session` - The browser session showing the feed
    /// * `feed` - The scrollable feed container
    /// * `anchors` - Listing anchors to count
    /// * `observer` - Receives one notification per measurement
    ///
    /// # Returns
    ///
    /// * `Ok(ConvergenceOutcome)` - The final count and why the loop stopped
    /// * `Err(SessionError)` - The session failed while measuring or scrolling
    pub async fn discover_candidates<S>(
        &self,
        session: &mut S,
        feed: &Locator,
        anchors: &Locator,
        observer: &mut dyn HarvestObserver,
    ) -> SessionResult<ConvergenceOutcome>
    where
        S: BrowserSession + ?Sized,
    {
        let mut state = RunState::new();

        loop {
            let count = session.current_document().await?.count(anchors);
            let grew = state.record(count);
            tracing::debug!(
                "Measured {} anchors (grew: {}, stalls: {})",
                count,
                grew,
                state.stalls
            );
            observer.iteration_measured(&state, self.target);

            if let Some(reason) = state.stop_reason(self.target, self.stall_limit) {
                observer.discovery_stopped(&state, reason);
                return Ok(ConvergenceOutcome {
                    count: state.current,
                    iterations: state.iteration,
                    reason,
                });
            }

            session.invoke_scroll_step(feed, self.scroll_step).await?;
            tokio::time::sleep(self.settle).await;
        }
    }
}
