//! Terminal output formatter

use super::{short_id, source_label};
use pdfqa_core::{Answer, BootstrapReport, RetrievalResult};

pub fn format_answer(answer: &Answer) -> String {
    let mut output = format!("{}\n", answer.answer);

    if !answer.sources.is_empty() {
        output.push_str("\nSources:\n");
        for (i, source) in answer.sources.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} ({:.2}) #{}\n",
                i + 1,
                source_label(&source.metadata),
                source.score,
                short_id(&source.chunk_id)
            ));
        }
    }

    output
}

pub fn format_results(results: &[RetrievalResult], full: bool) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut output = String::new();

    for result in results {
        let score_pct = (result.similarity_score.max(0.0) * 100.0) as u32;
        output.push_str(&format!(
            "{:>3}% {} #{}\n",
            score_pct,
            source_label(&result.metadata),
            short_id(&result.chunk_id)
        ));

        if full {
            let lines: Vec<&str> = result.content.lines().take(5).collect();
            for line in &lines {
                output.push_str(&format!("  {}\n", line));
            }
            if result.content.lines().count() > 5 {
                output.push_str("  ...\n");
            }
        }
    }

    output
}

pub fn format_report(report: &BootstrapReport) -> String {
    if report.skipped {
        return format!(
            "Store already holds {} chunks, nothing ingested\n",
            report.stored
        );
    }

    format!(
        "Ingestion complete:\n  Documents:     {}\n  Chunks added:  {}\n  Chunks stored: {}\n",
        report.documents, report.chunks, report.stored
    )
}
