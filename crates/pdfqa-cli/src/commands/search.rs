//! Search command

use super::{joined, parse_filters};
use crate::app::{OutputFormat, SearchArgs};
use crate::output::format_results;
use anyhow::Result;
use pdfqa_core::{CollectionStore, Config, HttpEmbedder, PdfQaError, Retriever, SearchOptions};
use std::sync::Arc;

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = joined(&args.query, "Query")?;
    let filter = parse_filters(&args.filters)?;
    if !(-1.0..=1.0).contains(&args.min_score) {
        return Err(PdfQaError::InvalidInput(format!(
            "--min-score {} is outside [-1, 1]",
            args.min_score
        ))
        .into());
    }

    let store = Arc::new(CollectionStore::open(&config.vector_store)?);
    let embedder = Arc::new(HttpEmbedder::connect(config.llm_service.clone()).await?);
    let retriever = Retriever::new(embedder, store);

    let options = SearchOptions {
        top_k: args.limit,
        score_threshold: args.min_score,
        filter,
    };
    let results = retriever.retrieve(&query, &options).await?;

    if results.is_empty() && format == OutputFormat::Cli {
        println!("No results found");
        return Ok(());
    }

    print!("{}", format_results(&results, format, args.full));
    Ok(())
}
