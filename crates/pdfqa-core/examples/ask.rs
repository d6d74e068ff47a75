// Ask a question using pdfqa as a library
//
// Needs an OpenAI-compatible service (PDFQA_LLM_URL) and PDFs under ./pdf_files.
//
//     cargo run --example ask -- "What does the warranty cover?"

use pdfqa_core::{
    CollectionStore, Config, DocumentChunker, HttpEmbedder, HttpGenerator, PdfLoader, RagPipeline,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> pdfqa_core::Result<()> {
    let question = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let question = if question.trim().is_empty() {
        "What are these documents about?".to_string()
    } else {
        question
    };

    let config = Config::load()?;
    println!("Opening store at: {}", config.vector_store.database_path().display());
    let store = Arc::new(CollectionStore::open(&config.vector_store)?);

    println!("Connecting to {}...", config.llm_service.url);
    let embedder = Arc::new(HttpEmbedder::connect(config.llm_service.clone()).await?);
    let generator = Arc::new(HttpGenerator::from_config(config.llm_service.clone())?);

    let pipeline = RagPipeline::builder()
        .embedder(embedder)
        .store(store)
        .generator(generator)
        .chunker(DocumentChunker::from_config(&config.chunking)?)
        .retrieval(config.retrieval)
        .build()?;

    let report = pipeline
        .bootstrap(&PdfLoader::from_config(&config.documents))
        .await?;
    if report.skipped {
        println!("Store already holds {} chunks", report.stored);
    } else {
        println!(
            "Indexed {} chunks from {} pages",
            report.chunks, report.documents
        );
    }

    println!("\nQ: {}", question);
    let answer = pipeline.run(&question).await?;
    println!("A: {}\n", answer.answer);

    for source in &answer.sources {
        println!(
            "  {:.3}  {}",
            source.score,
            source
                .metadata
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
        );
    }

    Ok(())
}
