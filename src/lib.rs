//! Gleaner: an incremental listing harvester
//!
//! This crate drives a browser session through an infinite-scroll result feed,
//! collects stable identifiers for every listing it finds, extracts one record
//! per detail page, and turns the partial, heterogeneous records into a ranked
//! report.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod rank;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod url;

use thiserror::Error;

/// Main error type for Gleaner operations
#[derive(Debug, Error)]
pub enum GleanError {
    #[error("Setup failed: {reason}")]
    Setup { reason: String },

    #[error("Browser session error: {0}")]
    Session(#[from] browser::SessionError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {field}: {message}")]
    InvalidSelector { field: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Link is not a candidate: {0}")]
    Excluded(String),
}

/// Result type alias for Gleaner operations
pub type Result<T> = std::result::Result<T, GleanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use browser::{BrowserSession, Document, Locator, WebDriverSession};
pub use config::Config;
pub use crawler::{Harvest, Harvester, HarvestObserver, TracingObserver};
pub use extract::{Record, RecordBuilder};
pub use rank::rank;
pub use state::{CandidateId, Catalog, RunState, SkipReason};
pub use crate::url::{build_search_url, canonical_candidate};
