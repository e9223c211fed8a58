//! Report writer traits and types
//!
//! This module defines the report model handed to writers (rows, summary,
//! run metadata) and the trait every output format implements.

use crate::crawler::Harvest;
use crate::extract::{fields, Record};
use crate::state::Catalog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One report row, in rank order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// 1-based position in the ranked report
    pub index: usize,
    pub name: String,
    pub cuisine: String,
    pub rating: Option<f64>,
    pub review_count: u64,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub source_url: String,
}

impl ReportRow {
    fn from_record(index: usize, record: &Record) -> Self {
        Self {
            index,
            name: record.name().to_string(),
            cuisine: record.text(fields::CUISINE).to_string(),
            rating: record.rating(),
            review_count: record.review_count(),
            address: record.text(fields::ADDRESS).to_string(),
            phone: record.text(fields::PHONE).to_string(),
            website: record.text(fields::WEBSITE).to_string(),
            source_url: record.source_url().to_string(),
        }
    }
}

/// Aggregate figures for the trailing summary row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Number of rows in the report
    pub count: usize,

    /// Rows with a rating
    pub rated: usize,

    /// Mean over rated rows, rounded to two decimals; 0 when nothing is rated
    pub mean_rating: f64,
}

impl ReportSummary {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        let ratings: Vec<f64> = rows.iter().filter_map(|row| row.rating).collect();
        let mean = ratings.iter().sum::<f64>() / ratings.len().max(1) as f64;

        Self {
            count: rows.len(),
            rated: ratings.len(),
            mean_rating: (mean * 100.0).round() / 100.0,
        }
    }
}

/// Information about the run that produced a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub query: String,
    pub generated_at: DateTime<Utc>,
    pub target_requested: usize,
    pub candidates_found: usize,
    pub achieved: usize,
    pub skipped: usize,
    pub stop_reason: String,
    pub config_hash: String,
}

impl RunMetadata {
    /// Describes a finished harvest
    ///
    /// # Arguments
    ///
    /// * `harvest` - The completed run
    /// * `query` - The search query the run used
    /// * `config_hash` - Hash of the configuration file
    pub fn from_harvest(harvest: &Harvest, query: &str, config_hash: &str) -> Self {
        Self {
            query: query.to_string(),
            generated_at: Utc::now(),
            target_requested: harvest.target,
            candidates_found: harvest.candidates_found,
            achieved: harvest.catalog.len(),
            skipped: harvest.skipped.len(),
            stop_reason: harvest.stop_reason.to_string(),
            config_hash: config_hash.to_string(),
        }
    }
}

/// A fully assembled report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub meta: RunMetadata,
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

impl Report {
    /// Builds one row per record, numbered in catalog order
    ///
    /// Row numbers come from the position in the ranked catalog, never from
    /// any record field.
    pub fn assemble(catalog: &Catalog, meta: RunMetadata) -> Self {
        let rows: Vec<ReportRow> = catalog
            .iter()
            .enumerate()
            .map(|(i, record)| ReportRow::from_record(i + 1, record))
            .collect();
        let summary = ReportSummary::from_rows(&rows);

        Self {
            meta,
            rows,
            summary,
        }
    }
}

/// Trait for report writers
///
/// A writer renders a [`Report`] into one format. Persisting it is shared:
/// parent directories are created and the file is replaced.
pub trait ReportWriter {
    /// Short format name, used in log messages
    fn name(&self) -> &'static str;

    /// Renders the report
    ///
    /// # Arguments
    ///
    /// * `report` - The assembled report
    ///
    /// # Returns
    ///
    /// The rendered artifact
    fn render(&self, report: &Report) -> OutputResult<String>;

    /// Renders the report and writes it to `path`
    fn write(&self, report: &Report, path: &Path) -> OutputResult<()> {
        let rendered = self.render(report)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::Write(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        std::fs::write(path, rendered)?;
        tracing::info!("Wrote {} report to {}", self.name(), path.display());
        Ok(())
    }
}
