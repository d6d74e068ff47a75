//! JSON output formatter

use pdfqa_core::{Answer, BootstrapReport, RetrievalResult};

pub fn format_answer(answer: &Answer) -> String {
    serde_json::to_string_pretty(answer).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_results(results: &[RetrievalResult]) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|r| {
            serde_json::json!({
                "chunk_id": r.chunk_id,
                "rank": r.rank,
                "score": r.similarity_score,
                "metadata": r.metadata,
                "content": r.content,
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}

pub fn format_report(report: &BootstrapReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
