//! Field descriptors and the single extraction routine that consumes them
//!
//! Every field follows the same policy: locate, parse, fall back to the
//! declared default on any failure. Nothing here returns an error to the
//! caller of [`extract`].

use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Placeholder rendered for text fields that could not be captured
pub const NOT_AVAILABLE: &str = "N/A";

/// Why a field fell back to its default
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("locator matched nothing")]
    Missing,

    #[error("could not parse {raw:?}")]
    Malformed { raw: String },
}

/// A typed field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Decimal(Option<f64>),
    Count(u64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Decimal(value) => *value,
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Decimal(Some(value)) => write!(f, "{}", value),
            Self::Decimal(None) => f.write_str(NOT_AVAILABLE),
            Self::Count(count) => write!(f, "{}", count),
        }
    }
}

/// Where the raw string comes from once the element is found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// The element's text content, whitespace-collapsed
    Text,

    /// The value of the named attribute
    Attribute(String),
}

/// How the raw string becomes a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldParser {
    /// Non-empty trimmed text
    Text,

    /// Decimal number; accepts `,` as the decimal separator
    Decimal,

    /// All ASCII digits in the string, concatenated (`"(1,234)"` -> 1234)
    DigitCount,
}

impl FieldParser {
    /// Parses `raw`, returning `None` when the content does not fit
    pub fn parse(&self, raw: &str) -> Option<FieldValue> {
        let raw = raw.trim();
        match self {
            Self::Text => {
                if raw.is_empty() {
                    None
                } else {
                    Some(FieldValue::Text(raw.to_string()))
                }
            }
            Self::Decimal => raw
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| FieldValue::Decimal(Some(v))),
            Self::DigitCount => {
                let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
                digits.parse::<u64>().ok().map(FieldValue::Count)
            }
        }
    }
}

/// Describes how to find and interpret one attribute on a detail page
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub selector: Selector,
    pub source: FieldSource,
    pub parser: FieldParser,
    pub default: FieldValue,
}

impl FieldDescriptor {
    /// Creates a descriptor reading the text of the first element matching `css`
    pub fn new(
        name: &'static str,
        css: &str,
        parser: FieldParser,
        default: FieldValue,
    ) -> Result<Self, ConfigError> {
        let selector = Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
            field: name.to_string(),
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            name,
            selector,
            source: FieldSource::Text,
            parser,
            default,
        })
    }

    /// Reads `attribute` instead of the element text
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.source = FieldSource::Attribute(attribute.into());
        self
    }
}

/// Locates and parses one field, reporting why it failed
pub fn try_extract(document: &Html, descriptor: &FieldDescriptor) -> Result<FieldValue, FieldError> {
    let element = document
        .select(&descriptor.selector)
        .next()
        .ok_or(FieldError::Missing)?;

    let raw = match &descriptor.source {
        FieldSource::Text => element_text(element),
        FieldSource::Attribute(attribute) => element
            .value()
            .attr(attribute)
            .ok_or(FieldError::Missing)?
            .to_string(),
    };

    descriptor
        .parser
        .parse(&raw)
        .ok_or(FieldError::Malformed { raw })
}

/// Locates and parses one field, substituting the declared default on failure
pub fn extract(document: &Html, descriptor: &FieldDescriptor) -> FieldValue {
    try_extract(document, descriptor).unwrap_or_else(|e| {
        tracing::trace!(field = descriptor.name, "Using default: {}", e);
        descriptor.default.clone()
    })
}

/// Element text with runs of whitespace collapsed to single spaces
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
