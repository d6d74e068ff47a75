//! Ingest command

use super::build_pipeline;
use crate::app::OutputFormat;
use crate::output::format_report;
use anyhow::Result;
use pdfqa_core::{Config, PdfLoader};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let loader = PdfLoader::from_config(&config.documents);

    if format == OutputFormat::Cli {
        eprintln!("Ingesting {:?}...", config.documents.directory);
    }
    let report = pipeline.bootstrap(&loader).await?;

    print!("{}", format_report(&report, format));
    Ok(())
}
