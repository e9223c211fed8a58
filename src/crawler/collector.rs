//! Candidate collection from the rendered feed
//!
//! Anchors are reduced to canonical detail-page URLs immediately; no element
//! outlives the document snapshot it came from.

use crate::browser::{Document, Locator};
use crate::state::CandidateId;
use crate::url::canonical_candidate;
use std::collections::HashSet;

/// Accumulates unique candidate identifiers in first-seen order
#[derive(Debug, Clone)]
pub struct CandidateCollector {
    anchors: Locator,
    seen: HashSet<CandidateId>,
    ordered: Vec<CandidateId>,
}

impl CandidateCollector {
    pub fn new(anchors: Locator) -> Self {
        Self {
            anchors,
            seen: HashSet::new(),
            ordered: Vec::new(),
        }
    }

    /// Reads every rendered listing anchor and returns at most `max_results`
    /// candidates
    ///
    /// New identifiers are appended after the ones already seen, so calling
    /// this again on an unchanged feed returns the same sequence.
    ///
    /// # Arguments
    ///
    /// * `document` - Snapshot of the listing page
    /// * `max_results` - Upper bound on the returned sequence
    pub fn collect(&mut self, document: &Document, max_results: usize) -> Vec<CandidateId> {
        let Some(base_url) = document.base_url() else {
            tracing::warn!("Listing page URL {:?} is not absolute", document.url);
            return self.snapshot(max_results);
        };

        let hrefs: Vec<String> = document
            .parse()
            .select(self.anchors.selector())
            .filter_map(|anchor| anchor.value().attr("href").map(str::to_string))
            .collect();

        let mut added = 0;
        for href in &hrefs {
            match canonical_candidate(href, &base_url) {
                Ok(url) => {
                    let id = CandidateId::from(url);
                    if self.seen.insert(id.clone()) {
                        self.ordered.push(id);
                        added += 1;
                    }
                }
                Err(e) => tracing::debug!("Ignoring anchor {:?}: {}", href, e),
            }
        }

        tracing::debug!(
            "{} anchors read, {} new candidates, {} total",
            hrefs.len(),
            added,
            self.ordered.len()
        );

        self.snapshot(max_results)
    }

    /// Number of unique candidates seen so far
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    fn snapshot(&self, max_results: usize) -> Vec<CandidateId> {
        self.ordered.iter().take(max_results).cloned().collect()
    }
}
