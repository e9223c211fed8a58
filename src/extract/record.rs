//! Record assembly from a detail document

use crate::browser::Document;
use crate::config::SelectorConfig;
use crate::extract::field::{extract, FieldDescriptor, FieldParser, FieldValue, NOT_AVAILABLE};
use crate::state::CandidateId;
use crate::ConfigError;
use scraper::Html;
use serde::Serialize;
use std::collections::BTreeMap;

/// Declared field names for place records
pub mod fields {
    pub const NAME: &str = "name";
    pub const CUISINE: &str = "cuisine";
    pub const RATING: &str = "rating";
    pub const REVIEW_COUNT: &str = "review_count";
    pub const ADDRESS: &str = "address";
    pub const PHONE: &str = "phone";
    pub const WEBSITE: &str = "website";
}

/// One extracted listing
///
/// Holds exactly one value per declared field, whether extracted or
/// defaulted. Only [`RecordBuilder`] creates records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    source_url: CandidateId,
    fields: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    pub fn source_url(&self) -> &CandidateId {
        &self.source_url
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Names of every field held by this record
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Text value of a field, or `"N/A"` when it is not a text field
    pub fn text(&self, name: &str) -> &str {
        self.get(name)
            .and_then(FieldValue::as_text)
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn name(&self) -> &str {
        self.text(fields::NAME)
    }

    pub fn rating(&self) -> Option<f64> {
        self.get(fields::RATING).and_then(FieldValue::as_decimal)
    }

    pub fn review_count(&self) -> u64 {
        self.get(fields::REVIEW_COUNT)
            .and_then(FieldValue::as_count)
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn sample(url: &str, name: &str, rating: Option<f64>, reviews: u64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(fields::NAME, FieldValue::Text(name.to_string()));
        values.insert(fields::CUISINE, FieldValue::Text(NOT_AVAILABLE.to_string()));
        values.insert(fields::RATING, FieldValue::Decimal(rating));
        values.insert(fields::REVIEW_COUNT, FieldValue::Count(reviews));
        values.insert(fields::ADDRESS, FieldValue::Text(NOT_AVAILABLE.to_string()));
        values.insert(fields::PHONE, FieldValue::Text(NOT_AVAILABLE.to_string()));
        values.insert(fields::WEBSITE, FieldValue::Text(NOT_AVAILABLE.to_string()));

        Self {
            source_url: url::Url::parse(url).expect("valid test url").into(),
            fields: values,
        }
    }
}

/// Builds records from a fixed table of field descriptors
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    descriptors: Vec<FieldDescriptor>,
}

impl RecordBuilder {
    /// Creates a builder for an arbitrary descriptor table
    ///
    /// Field names must be unique; a later descriptor with a repeated name
    /// replaces the earlier one in built records.
    pub fn new(descriptors: Vec<FieldDescriptor>) -> Self {
        Self { descriptors }
    }

    /// The place schema: name, cuisine, rating, review count, address, phone, website
    pub fn places(selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        let text_default = || FieldValue::Text(NOT_AVAILABLE.to_string());

        let mut review_count = FieldDescriptor::new(
            fields::REVIEW_COUNT,
            &selectors.review_count,
            FieldParser::DigitCount,
            FieldValue::Count(0),
        )?;
        if let Some(attribute) = &selectors.review_count_attribute {
            review_count = review_count.with_attribute(attribute.clone());
        }

        Ok(Self::new(vec![
            FieldDescriptor::new(
                fields::NAME,
                &selectors.name,
                FieldParser::Text,
                text_default(),
            )?,
            FieldDescriptor::new(
                fields::RATING,
                &selectors.rating,
                FieldParser::Decimal,
                FieldValue::Decimal(None),
            )?,
            review_count,
            FieldDescriptor::new(
                fields::CUISINE,
                &selectors.cuisine,
                FieldParser::Text,
                text_default(),
            )?,
            FieldDescriptor::new(
                fields::ADDRESS,
                &selectors.address,
                FieldParser::Text,
                text_default(),
            )?,
            FieldDescriptor::new(
                fields::PHONE,
                &selectors.phone,
                FieldParser::Text,
                text_default(),
            )?,
            FieldDescriptor::new(
                fields::WEBSITE,
                &selectors.website,
                FieldParser::Text,
                text_default(),
            )?,
        ]))
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Builds a record from a rendered detail document
    pub fn build(&self, document: &Document, source_url: &CandidateId) -> Record {
        self.build_from_html(&document.parse(), source_url)
    }

    /// Builds a record from an already parsed document
    ///
    /// Each field is extracted independently; one field's absence never
    /// affects another.
    pub fn build_from_html(&self, html: &Html, source_url: &CandidateId) -> Record {
        let fields = self
            .descriptors
            .iter()
            .map(|descriptor| (descriptor.name, extract(html, descriptor)))
            .collect();

        Record {
            source_url: source_url.clone(),
            fields,
        }
    }
}
