//! Report formatter implementation

use super::{MaskReport, ReportFormat};
use crate::error::{Error, Result};
use crate::types::LayoutDocument;

/// Formats a report into the supported output formats
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &MaskReport, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::PlainText => Ok(Self::to_text(report)),
            ReportFormat::Json => Self::to_json(report),
        }
    }

    fn to_text(report: &MaskReport) -> String {
        let mut output = String::new();
        output.push_str("PDF Masking Report\n");
        output.push_str("==================\n\n");
        output.push_str(&format!("Generated: {}\n\n", report.generated_at));

        for outcome in &report.targets {
            let (_, line) = outcome.summary_line();
            output.push_str(&line);
            output.push('\n');
            for occurrence in &outcome.occurrences {
                output.push_str(&format!(
                    "    page {} chars {}..{} bbox {}\n",
                    occurrence.page_index, occurrence.start, occurrence.end, occurrence.bbox
                ));
            }
        }

        output.push('\n');
        output.push_str(&report.total_line());
        output.push('\n');
        output
    }

    /// Numbered listing of layout keys, optionally filtered by `term`
    pub fn field_listing(layout: &LayoutDocument, term: Option<&str>) -> String {
        let term = term.filter(|t| !t.is_empty());
        let fields = layout.search_keys(term);

        let mut output = String::new();
        output.push_str("Layout fields\n");
        output.push_str("=============\n");
        output.push_str(&format!("{} field(s) in layout\n", layout.char_count()));
        if let Some(term) = term {
            output.push_str(&format!("Search term: '{}'\n", term));
        }

        if fields.is_empty() {
            output.push_str("\nNo matching fields\n");
            return output;
        }

        output.push_str(&format!("\nMatching fields ({}):\n", fields.len()));
        for (i, record) in fields.iter().enumerate() {
            output.push_str(&format!(
                "{:3}. page {} | '{}' | bbox: {}\n",
                i + 1,
                record.page_index,
                record.key,
                record.bbox
            ));
        }
        output
    }

    fn to_json(report: &MaskReport) -> Result<String> {
        serde_json::to_string_pretty(report)
            .map_err(|e| Error::ReportError(format!("Serialization error: {}", e)))
    }
}
