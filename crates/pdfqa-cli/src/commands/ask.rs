//! Ask command

use super::{build_pipeline, joined, parse_filters};
use crate::app::{AskArgs, OutputFormat};
use crate::output::format_answer;
use anyhow::Result;
use pdfqa_core::{Config, PdfLoader};

pub async fn run(args: AskArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let question = joined(&args.question, "Question")?;
    let filter = parse_filters(&args.filters)?;

    let mut config = config.clone();
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(threshold) = args.threshold {
        config.retrieval.score_threshold = threshold;
    }
    if args.no_rewrite {
        config.retrieval.num_query_variants = 0;
    }
    config.validate()?;

    let pipeline = build_pipeline(&config).await?;

    // First question against an empty store populates it
    let report = pipeline
        .bootstrap(&PdfLoader::from_config(&config.documents))
        .await?;
    if !report.skipped {
        tracing::info!(
            "Indexed {} chunks from {} pages",
            report.chunks,
            report.documents
        );
    }

    let answer = pipeline.run_filtered(&question, filter.as_ref()).await?;
    print!("{}", format_answer(&answer, format));
    Ok(())
}
