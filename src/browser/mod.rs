//! Browser session capability
//!
//! The harvest pipeline talks to the browser only through [`BrowserSession`].
//! Every call is awaited before the next one is issued: the underlying driver
//! accepts one command at a time. No element handles ever cross this
//! boundary; callers get plain values (documents, counts) back.

mod webdriver;

pub use webdriver::{build_capabilities, check_status, WebDriverSession};

use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use scraper::{Html, Selector};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a browser session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error("Could not start WebDriver session: {0}")]
    NewSession(#[from] NewSessionError),

    #[error("WebDriver command failed: {0}")]
    Command(#[from] CmdError),

    #[error("WebDriver is not ready: {0}")]
    NotReady(String),

    #[error("HTTP error talking to WebDriver: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    #[error("Browser session already closed")]
    Closed,
}

impl SessionError {
    /// Returns true if a bounded wait expired
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Command(CmdError::WaitTimeout) => true,
            Self::Command(CmdError::Standard(e)) => e.error() == "timeout",
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// A compiled CSS locator
///
/// Keeps the source text for the driver and the compiled selector for
/// counting matches in a captured document.
#[derive(Debug, Clone)]
pub struct Locator {
    css: String,
    selector: Selector,
}

impl Locator {
    /// Compiles `css`, reporting failures against `field`
    pub fn parse(field: &str, css: &str) -> Result<Self, crate::ConfigError> {
        let selector = Selector::parse(css).map_err(|e| crate::ConfigError::InvalidSelector {
            field: field.to_string(),
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)
    }
}

/// A snapshot of the rendered page: its URL and serialized DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
    pub source: String,
}

impl Document {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Parses the snapshot; the result must not be held across an `.await`
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.source)
    }

    /// The document URL, used to resolve relative links
    pub fn base_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }

    /// Number of elements matching `locator`
    pub fn count(&self, locator: &Locator) -> usize {
        self.parse().select(locator.selector()).count()
    }
}

/// Capability interface over a single-stream browser session
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` in the current tab
    async fn navigate(&mut self, url: &str) -> SessionResult<()>;

    /// Captures the currently rendered document
    async fn current_document(&mut self) -> SessionResult<Document>;

    /// Scrolls the container matched by `container` down by `pixels`
    async fn invoke_scroll_step(&mut self, container: &Locator, pixels: u32) -> SessionResult<()>;

    /// Waits until at least one element matches `locator`
    ///
    /// Returns [`SessionError::Timeout`] when `timeout` expires first.
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> SessionResult<()>;

    /// Releases the session. Calling it again is a no-op.
    async fn close(&mut self) -> SessionResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_parse() {
        let locator = Locator::parse("feed", r#"div[role="feed"]"#).unwrap();
        assert_eq!(locator.css(), r#"div[role="feed"]"#);
        assert_eq!(locator.to_string(), r#"div[role="feed"]"#);

        assert!(Locator::parse("feed", "div[[").is_err());
    }

    #[test]
    fn test_document_count() {
        let document = Document::new(
            "https://maps.example.com/search/pizza",
            r#"<div role="feed"><a href="/place/a">A</a><a href="/place/b">B</a><a href="/other">C</a></div>"#,
        );
        let anchors = Locator::parse("listing-anchor", r#"a[href*="/place/"]"#).unwrap();
        assert_eq!(document.count(&anchors), 2);
        assert_eq!(
            document.base_url().unwrap().as_str(),
            "https://maps.example.com/search/pizza"
        );
    }

    #[test]
    fn test_timeout_classification() {
        let timeout = SessionError::Timeout {
            what: "feed".to_string(),
            waited: Duration::from_secs(1),
        };
        assert!(timeout.is_timeout());
        assert!(!SessionError::Closed.is_timeout());
        assert!(!SessionError::Protocol("bad".to_string()).is_timeout());
        assert!(SessionError::Command(CmdError::WaitTimeout).is_timeout());
        assert!(!SessionError::NotReady("starting".to_string()).is_timeout());
    }
}
