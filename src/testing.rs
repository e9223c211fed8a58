//! Test support: a scripted in-memory browser session and fixtures
//!
//! Shared by the unit tests and, through the `test-support` feature, by the
//! integration tests.

use crate::browser::{BrowserSession, Document, Locator, SessionError, SessionResult};
use crate::config::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, ReportFormat, SearchConfig, SelectorConfig,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Search page the fixture configuration resolves to
pub const SEARCH_URL: &str = "https://maps.example.com/maps/search/pizza+in+Brooklyn";

pub fn feed() -> Locator {
    Locator::parse("feed", &SelectorConfig::default().feed).unwrap()
}

pub fn anchors() -> Locator {
    Locator::parse("listing-anchor", &SelectorConfig::default().listing_anchor).unwrap()
}

pub fn place_url(index: usize) -> String {
    format!("https://maps.example.com/maps/place/listing-{}", index)
}

/// Detail page in the default selector layout
pub fn place_page(name: &str, rating: Option<&str>, reviews: &str) -> String {
    let rating = rating
        .map(|r| format!(r#"<span aria-hidden="true">{}</span>"#, r))
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <h1 class="DUwDvf">{name}</h1>
            <div class="F7nice">{rating}<span aria-label="{reviews} reviews">({reviews})</span></div>
            <button class="DkEaL">Pizza restaurant</button>
            <button data-item-id="address"><div class="Io6YTe">{name} Street 1</div></button>
        </body></html>"#
    )
}

/// Configuration pointed at [`SEARCH_URL`] with short timings
pub fn create_test_config(max_results: usize, stall_limit: u32) -> Config {
    Config {
        search: SearchConfig {
            query: "pizza in Brooklyn".to_string(),
            url_template: "https://maps.example.com/maps/search/{query}".to_string(),
        },
        crawler: CrawlerConfig {
            max_results,
            stall_limit,
            settle_interval: 100,
            page_load_timeout: 50,
            detail_settle: 0,
            scroll_step: 1200,
            poll_interval: 10,
        },
        browser: BrowserConfig::default(),
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            report_path: "./report.md".to_string(),
            format: ReportFormat::Markdown,
            debug_dump_path: None,
        },
    }
}

/// A browser session whose listing feed grows according to a fixed script
///
/// Any URL without a scripted page is the listing page. Every document read
/// there consumes the next feed count; the last count repeats once the script
/// runs out. A scripted page mapped to `None` times out on navigation.
pub struct ScriptedSession {
    feed: Vec<usize>,
    cursor: usize,
    pages: HashMap<String, Option<String>>,
    current: String,
    fail_documents: bool,
    navigations: Vec<String>,
    scrolls: usize,
    closes: usize,
}

impl ScriptedSession {
    pub fn new(feed: Vec<usize>) -> Self {
        Self {
            feed,
            cursor: 0,
            pages: HashMap::new(),
            current: SEARCH_URL.to_string(),
            fail_documents: false,
            navigations: Vec::new(),
            scrolls: 0,
            closes: 0,
        }
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Some(html.into()));
        self
    }

    pub fn timing_out(mut self, url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), None);
        self
    }

    /// Makes every document capture fail; waits still see the page
    pub fn failing_documents(mut self) -> Self {
        self.fail_documents = true;
        self
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls
    }

    pub fn closes(&self) -> usize {
        self.closes
    }

    fn is_closed(&self) -> bool {
        self.closes > 0
    }

    fn listing_source(count: usize) -> String {
        let anchors: String = (0..count)
            .map(|i| format!(r#"<a class="hfpxzc" href="/maps/place/listing-{i}">Listing {i}</a>"#))
            .collect();
        format!(r#"<html><body><div role="feed">{anchors}</div></body></html>"#)
    }

    fn on_listing(&self) -> bool {
        !self.pages.contains_key(&self.current)
    }

    fn snapshot(&self) -> Document {
        match self.pages.get(&self.current) {
            Some(Some(html)) => Document::new(self.current.clone(), html.clone()),
            Some(None) => Document::new(self.current.clone(), "<html></html>"),
            None => {
                let index = self.cursor.min(self.feed.len().saturating_sub(1));
                let count = self.feed.get(index).copied().unwrap_or(0);
                Document::new(self.current.clone(), Self::listing_source(count))
            }
        }
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.navigations.push(url.to_string());
        if let Some(None) = self.pages.get(url) {
            return Err(SessionError::Timeout {
                what: format!("page load of {}", url),
                waited: Duration::from_millis(50),
            });
        }
        self.current = url.to_string();
        Ok(())
    }

    async fn current_document(&mut self) -> SessionResult<Document> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        if self.fail_documents {
            return Err(SessionError::Protocol("page source unavailable".to_string()));
        }
        let document = self.snapshot();
        if self.on_listing() {
            self.cursor += 1;
        }
        Ok(document)
    }

    async fn invoke_scroll_step(&mut self, _container: &Locator, _pixels: u32) -> SessionResult<()> {
        self.scrolls += 1;
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> SessionResult<()> {
        if self.snapshot().count(locator) > 0 {
            Ok(())
        } else {
            Err(SessionError::Timeout {
                what: locator.css().to_string(),
                waited: timeout,
            })
        }
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.closes += 1;
        Ok(())
    }
}
