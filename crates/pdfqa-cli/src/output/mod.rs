//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use pdfqa_core::{Answer, BootstrapReport, RetrievalResult};

pub use pdfqa_core::providers::source_label;

/// Format an answer with its sources
pub fn format_answer(answer: &Answer, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_answer(answer),
        OutputFormat::Cli => terminal::format_answer(answer),
    }
}

/// Format raw retrieval results
pub fn format_results(results: &[RetrievalResult], format: OutputFormat, full: bool) -> String {
    match format {
        OutputFormat::Json => json::format_results(results),
        OutputFormat::Cli => terminal::format_results(results, full),
    }
}

/// Format a bootstrap report
pub fn format_report(report: &BootstrapReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_report(report),
        OutputFormat::Cli => terminal::format_report(report),
    }
}

/// First 8 characters of a chunk id
pub fn short_id(chunk_id: &str) -> &str {
    chunk_id
        .char_indices()
        .nth(8)
        .map(|(i, _)| &chunk_id[..i])
        .unwrap_or(chunk_id)
}
