//! Harvest coordinator - main run orchestration logic
//!
//! This module sequences one complete run:
//! - Opening the search page and waiting for the results feed
//! - Scrolling the feed until it converges
//! - Collecting candidate identifiers
//! - Crawling every detail page
//! - Ranking the resulting catalog
//!
//! The browser session is released on every exit path.

use crate::browser::{BrowserSession, Locator};
use crate::config::Config;
use crate::crawler::{
    CandidateCollector, DetailCrawler, HarvestObserver, ListingConvergence, TracingObserver,
};
use crate::extract::RecordBuilder;
use crate::rank::rank;
use crate::state::{Catalog, SkippedItem, StopReason};
use crate::url::build_search_url;
use crate::{ConfigError, GleanError};
use std::path::Path;
use url::Url;

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Records in rank order
    pub catalog: Catalog,

    /// Requested number of listings
    pub target: usize,

    /// Number of candidates collected from the feed
    pub candidates_found: usize,

    /// Candidates that produced no record
    pub skipped: Vec<SkippedItem>,

    /// Why listing discovery stopped
    pub stop_reason: StopReason,

    /// Convergence iterations taken
    pub iterations: u32,
}

impl Harvest {
    /// True when fewer records were produced than requested
    pub fn is_partial(&self) -> bool {
        self.catalog.len() < self.target
    }
}

/// Main harvest coordinator structure
///
/// Holds the compiled selectors for one run. Building it needs no browser, so
/// a bad selector is reported before any session is opened.
pub struct Harvester {
    config: Config,
    feed: Locator,
    anchors: Locator,
    identity: Locator,
    builder: RecordBuilder,
    observer: Box<dyn HarvestObserver>,
}

impl Harvester {
    /// Creates a new harvester from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The validated run configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Every configured selector compiled
    /// * `Err(ConfigError)` - A selector failed to compile
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let feed = Locator::parse("feed", &config.selectors.feed)?;
        let anchors = Locator::parse("listing-anchor", &config.selectors.listing_anchor)?;
        let identity = Locator::parse("name", &config.selectors.name)?;
        let builder = RecordBuilder::places(&config.selectors)?;

        Ok(Self {
            config,
            feed,
            anchors,
            identity,
            builder,
            observer: Box::new(TracingObserver),
        })
    }

    /// Replaces the default tracing observer
    pub fn with_observer(mut self, observer: impl HarvestObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the complete harvest and releases the session
    ///
    /// This is the core pipeline that:
    /// 1. Opens the search page and waits for the results feed
    /// 2. Scrolls the feed until the target is reached or growth stalls
    /// 3. Collects candidate identifiers
    /// 4. Extracts one record per candidate
    /// 5. Ranks the records
    ///
    /// `session` is closed before this returns, whatever the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvest)` - The ranked catalog, possibly partial or empty
    /// * `Err(GleanError::Setup)` - The search page or its feed never loaded
    /// * `Err(GleanError)` - The session failed outside per-item work
    pub async fn run<S>(&mut self, session: &mut S) -> crate::Result<Harvest>
    where
        S: BrowserSession + ?Sized,
    {
        let result = self.harvest(session).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        result
    }

    async fn harvest<S>(&mut self, session: &mut S) -> crate::Result<Harvest>
    where
        S: BrowserSession + ?Sized,
    {
        let search_url = build_search_url(
            &self.config.search.url_template,
            &self.config.search.query,
        )?;

        if let Err(e) = self.open_feed(session, &search_url).await {
            tracing::error!("Setup failed: {}", e);
            self.dump_debug_page(session).await;
            return Err(e);
        }

        let target = self.config.crawler.max_results;
        let convergence = ListingConvergence::from_config(&self.config.crawler);
        let outcome = convergence
            .discover_candidates(session, &self.feed, &self.anchors, &mut *self.observer)
            .await?;

        let listing = session.current_document().await?;
        let mut collector = CandidateCollector::new(self.anchors.clone());
        let candidates = collector.collect(&listing, target);
        self.observer.candidates_collected(candidates.len(), target);

        let crawler = DetailCrawler::new(
            &self.builder,
            &self.identity,
            self.config.crawler.page_load_timeout(),
            self.config.crawler.detail_settle(),
        );
        let details = crawler
            .extract_all(session, &candidates, &mut *self.observer)
            .await;

        Ok(Harvest {
            catalog: rank(details.catalog),
            target,
            candidates_found: candidates.len(),
            skipped: details.skipped,
            stop_reason: outcome.reason,
            iterations: outcome.iterations,
        })
    }

    /// Loads the search page and waits for the results feed
    async fn open_feed<S>(&self, session: &mut S, search_url: &Url) -> crate::Result<()>
    where
        S: BrowserSession + ?Sized,
    {
        tracing::info!("Opening search page: {}", search_url);

        session
            .navigate(search_url.as_str())
            .await
            .map_err(|e| GleanError::Setup {
                reason: format!("search page did not load: {}", e),
            })?;

        session
            .wait_for(&self.feed, self.config.crawler.page_load_timeout())
            .await
            .map_err(|e| GleanError::Setup {
                reason: format!("results feed never appeared: {}", e),
            })
    }

    /// Saves the current page source for inspection, if configured
    async fn dump_debug_page<S>(&self, session: &mut S)
    where
        S: BrowserSession + ?Sized,
    {
        let Some(path) = self.config.output.debug_dump_path.as_deref() else {
            return;
        };

        let document = match session.current_document().await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Could not capture page for debug dump: {}", e);
                return;
            }
        };

        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!("Could not create {}: {}", parent.display(), e);
                return;
            }
        }

        match tokio::fs::write(path, document.source.as_bytes()).await {
            Ok(()) => tracing::info!("Saved page source to {}", path.display()),
            Err(e) => tracing::warn!("Could not write debug dump {}: {}", path.display(), e),
        }
    }
}
