//! Detail crawl: one navigation and one record per candidate
//!
//! Candidates are visited strictly in order, one at a time. A failure on one
//! candidate is classified, reported, and never retried; the next candidate
//! starts from a fresh navigation.

use crate::browser::{BrowserSession, Locator, SessionError};
use crate::crawler::HarvestObserver;
use crate::extract::{Record, RecordBuilder};
use crate::state::{CandidateId, Catalog, SkipReason, SkippedItem};
use std::time::Duration;

/// Records built from a candidate list, plus the candidates that produced none
#[derive(Debug, Clone, Default)]
pub struct DetailOutcome {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedItem>,
}

/// Visits detail pages and builds records from them
pub struct DetailCrawler<'a> {
    builder: &'a RecordBuilder,
    identity: &'a Locator,
    identity_timeout: Duration,
    settle: Duration,
}

impl<'a> DetailCrawler<'a> {
    /// # Arguments
    ///
    /// * `builder` - Field table applied to every detail page
    /// * `identity` - Element that must appear before a page counts as loaded
    /// * `identity_timeout` - Bound on the wait for `identity`
    /// * `settle` - Extra wait for late-rendering fields once `identity` is present
    pub fn new(
        builder: &'a RecordBuilder,
        identity: &'a Locator,
        identity_timeout: Duration,
        settle: Duration,
    ) -> Self {
        Self {
            builder,
            identity,
            identity_timeout,
            settle,
        }
    }

    /// Extracts one record per candidate, in candidate order
    ///
    /// Progress is numbered against the candidate list, so positions stay
    /// stable even when items are skipped.
    pub async fn extract_all<S>(
        &self,
        session: &mut S,
        candidates: &[CandidateId],
        observer: &mut dyn HarvestObserver,
    ) -> DetailOutcome
    where
        S: BrowserSession + ?Sized,
    {
        let total = candidates.len();
        let mut outcome = DetailOutcome {
            catalog: Catalog::with_capacity(total),
            skipped: Vec::new(),
        };

        for (index, candidate) in candidates.iter().enumerate() {
            let position = index + 1;

            match self.extract_one(session, candidate).await {
                Ok(record) => {
                    observer.item_extracted(position, total, &record);
                    outcome.catalog.push(record);
                }
                Err(reason) => {
                    let item = SkippedItem {
                        position,
                        candidate: candidate.clone(),
                        reason,
                    };
                    observer.item_skipped(total, &item);
                    outcome.skipped.push(item);
                }
            }
        }

        observer.run_complete(outcome.catalog.len(), total, outcome.skipped.len());
        outcome
    }

    /// Navigates to one candidate and builds its record
    async fn extract_one<S>(&self, session: &mut S, candidate: &CandidateId) -> Result<Record, SkipReason>
    where
        S: BrowserSession + ?Sized,
    {
        session
            .navigate(candidate.as_str())
            .await
            .map_err(|e| classify_navigation(&e))?;

        session
            .wait_for(self.identity, self.identity_timeout)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SkipReason::IdentityTimeout
                } else {
                    SkipReason::DocumentUnavailable(e.to_string())
                }
            })?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let document = session
            .current_document()
            .await
            .map_err(|e| SkipReason::DocumentUnavailable(e.to_string()))?;

        Ok(self.builder.build(&document, candidate))
    }
}

fn classify_navigation(error: &SessionError) -> SkipReason {
    if error.is_timeout() {
        SkipReason::NavigationTimeout
    } else {
        SkipReason::NavigationFailed(error.to_string())
    }
}
