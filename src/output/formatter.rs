//! Output formatters for run summaries
//!
//! Provides text, JSON and brief output formats.

use crate::pipeline::RunSummary;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Run summary formatter
pub struct SummaryFormatter {
    format: OutputFormat,
}

impl SummaryFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Text => summary.to_string(),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Summary => self.format_brief(summary),
        }
    }

    fn format_brief(&self, summary: &RunSummary) -> String {
        format!(
            "{}: {}/{} report(s) converted, {} skipped, {} with failures ({} failed test(s)) in {}ms",
            summary.verdict,
            summary.converted_count(),
            summary.files_found,
            summary.skipped_count(),
            summary.failing_count(),
            summary.totals.failed,
            summary.duration_ms
        )
    }
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}
