//! Markdown report generation
//!
//! This module renders a human-readable markdown report of harvest results:
//! run information, the ranked table, and a trailing summary row.

use crate::extract::NOT_AVAILABLE;
use crate::output::traits::{OutputResult, Report, ReportRow, ReportWriter};

/// Ratings at or above this are rendered bold
const HIGHLIGHT_RATING: f64 = 4.5;

/// Writes reports as markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownWriter;

impl ReportWriter for MarkdownWriter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, report: &Report) -> OutputResult<String> {
        Ok(format_markdown_report(report))
    }
}

/// Formats a report as markdown
///
/// # Arguments
///
/// * `report` - The assembled report
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(report: &Report) -> String {
    let meta = &report.meta;
    let mut md = String::new();

    // Title
    md.push_str(&format!("# Harvest Report: {}\n\n", escape_cell(&meta.query)));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Target Requested**: {}\n", meta.target_requested));
    md.push_str(&format!("- **Candidates Found**: {}\n", meta.candidates_found));
    md.push_str(&format!("- **Records Achieved**: {}\n", meta.achieved));
    md.push_str(&format!("- **Skipped**: {}\n", meta.skipped));
    md.push_str(&format!("- **Discovery Stopped**: {}\n", meta.stop_reason));
    md.push_str(&format!("- **Config Hash**: {}\n\n", meta.config_hash));

    // Ranked table
    md.push_str("## Results\n\n");
    md.push_str("| # | Name | Cuisine | Rating | Reviews | Address | Phone | Website | Source URL |\n");
    md.push_str("|---|------|---------|--------|---------|---------|-------|---------|------------|\n");

    for row in &report.rows {
        md.push_str(&format_row(row));
    }

    md.push_str(&format!(
        "| **Total** | {} | | {:.2} | | | | | |\n",
        report.summary.count, report.summary.mean_rating
    ));

    md
}

fn format_row(row: &ReportRow) -> String {
    let rating = match row.rating {
        Some(r) if r >= HIGHLIGHT_RATING => format!("**{:.1}**", r),
        Some(r) => format!("{:.1}", r),
        None => NOT_AVAILABLE.to_string(),
    };

    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
        row.index,
        escape_cell(&row.name),
        escape_cell(&row.cuisine),
        rating,
        row.review_count,
        escape_cell(&row.address),
        escape_cell(&row.phone),
        escape_cell(&row.website),
        escape_cell(&row.source_url),
    )
}

/// Escapes pipes and flattens newlines so text stays inside its cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
