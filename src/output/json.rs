//! JSON report generation

use crate::output::traits::{OutputResult, Report, ReportWriter};

/// Writes reports as pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl ReportWriter for JsonWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, report: &Report) -> OutputResult<String> {
        let mut rendered = serde_json::to_string_pretty(report)?;
        rendered.push('\n');
        Ok(rendered)
    }
}
