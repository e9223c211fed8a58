use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Gleaner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// What to search for and where
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Free-text search query
    pub query: String,

    /// Search page URL with a `{query}` placeholder
    #[serde(rename = "url-template", default = "default_url_template")]
    pub url_template: String,
}

/// Convergence loop and detail crawl tunables
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of listings to extract
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Consecutive non-growing measurements before the feed is considered exhausted
    #[serde(rename = "stall-limit", default = "default_stall_limit")]
    pub stall_limit: u32,

    /// Wait after each scroll step before measuring again (milliseconds)
    #[serde(rename = "settle-interval", default = "default_settle_interval")]
    pub settle_interval: u64,

    /// Upper bound on page loads and element waits (milliseconds)
    #[serde(rename = "page-load-timeout", default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// Wait after navigating to a detail page (milliseconds)
    #[serde(rename = "detail-settle", default = "default_detail_settle")]
    pub detail_settle: u64,

    /// Pixels scrolled per incremental-load step
    #[serde(rename = "scroll-step", default = "default_scroll_step")]
    pub scroll_step: u32,

    /// Interval between element-presence polls (milliseconds)
    #[serde(rename = "poll-interval", default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl CrawlerConfig {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout)
    }

    pub fn detail_settle(&self) -> Duration {
        Duration::from_millis(self.detail_settle)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

/// WebDriver endpoint and browser launch options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BrowserConfig {
    /// Base URL of a running WebDriver server (chromedriver, geckodriver, ...)
    pub webdriver_url: String,

    /// Browser requested in the session capabilities
    pub browser_name: String,

    pub headless: bool,

    /// Window size as `width,height`
    pub window_size: String,

    /// Preferred page language
    pub language: String,

    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            browser_name: "chrome".to_string(),
            headless: false,
            window_size: "1400,900".to_string(),
            language: "en-US".to_string(),
            user_agent: None,
        }
    }
}

/// CSS selectors describing the listing feed and the detail page layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorConfig {
    /// Scrollable container holding the result feed
    pub feed: String,

    /// Anchors inside the feed that link to detail pages
    pub listing_anchor: String,

    pub name: String,
    pub rating: String,
    pub review_count: String,

    /// Attribute holding the review count text; `None` reads the element text
    pub review_count_attribute: Option<String>,

    pub cuisine: String,
    pub address: String,
    pub phone: String,
    pub website: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            feed: r#"div[role="feed"]"#.to_string(),
            listing_anchor: r#"a[href*="/maps/place/"]"#.to_string(),
            name: r#"h1.DUwDvf, h1[class*="fontHeadlineLarge"]"#.to_string(),
            rating: r#"div.F7nice span[aria-hidden="true"]"#.to_string(),
            review_count: r#"div.F7nice span[aria-label*="review"]"#.to_string(),
            review_count_attribute: Some("aria-label".to_string()),
            cuisine: "button.DkEaL, span.mgr77e".to_string(),
            address: r#"button[data-item-id="address"] .Io6YTe"#.to_string(),
            phone: r#"button[data-item-id*="phone"] .Io6YTe"#.to_string(),
            website: r#"a[data-item-id="authority"] .Io6YTe"#.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the report file
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Report format
    #[serde(default)]
    pub format: ReportFormat,

    /// Where to save the page source when setup fails
    #[serde(rename = "debug-dump-path", default)]
    pub debug_dump_path: Option<String>,
}

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format '{}' (expected markdown or json)", other)),
        }
    }
}

fn default_url_template() -> String {
    "https://www.google.com/maps/search/{query}?hl=en".to_string()
}

fn default_stall_limit() -> u32 {
    5
}

fn default_settle_interval() -> u64 {
    2000
}

fn default_page_load_timeout() -> u64 {
    10_000
}

fn default_detail_settle() -> u64 {
    3000
}

fn default_scroll_step() -> u32 {
    1200
}

fn default_poll_interval() -> u64 {
    250
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("markdown".parse::<ReportFormat>(), Ok(ReportFormat::Markdown));
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert!("xlsx".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_crawler_durations() {
        let crawler: CrawlerConfig = toml::from_str("max-results = 10").unwrap();
        assert_eq!(crawler.settle_interval(), Duration::from_millis(2000));
        assert_eq!(crawler.page_load_timeout(), Duration::from_secs(10));
        assert_eq!(crawler.stall_limit, 5);
    }
}
