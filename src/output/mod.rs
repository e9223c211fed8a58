//! Output module for assembling and writing harvest reports
//!
//! This module handles:
//! - Assembling ranked records into report rows with a summary
//! - Rendering reports as markdown or JSON
//! - Writing the rendered report to disk

mod json;
mod markdown;
mod traits;

pub use json::JsonWriter;
pub use markdown::{format_markdown_report, MarkdownWriter};
pub use traits::{
    OutputError, OutputResult, Report, ReportRow, ReportSummary, ReportWriter, RunMetadata,
};

use crate::config::ReportFormat;
use std::path::Path;

/// Returns the writer for a configured report format
pub fn writer_for(format: ReportFormat) -> Box<dyn ReportWriter> {
    match format {
        ReportFormat::Markdown => Box::new(MarkdownWriter),
        ReportFormat::Json => Box::new(JsonWriter),
    }
}

/// Writes a report in the given format
///
/// # Arguments
///
/// * `report` - The assembled report
/// * `format` - Output format
/// * `path` - Destination file; parent directories are created
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Rendering or writing failed
pub fn write_report(report: &Report, format: ReportFormat, path: &Path) -> OutputResult<()> {
    writer_for(format).write(report, path)
}
