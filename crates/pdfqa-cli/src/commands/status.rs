//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use pdfqa_core::{CollectionStore, Config};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let store = CollectionStore::open(&config.vector_store)?;
    let stats = store.stats()?;
    let path = config.vector_store.database_path();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "collection": stats.name,
                "store": path,
                "chunks": stats.chunks,
                "sources": stats.sources,
                "dimensions": stats.dimensions,
                "created_at": stats.created_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!("Collection:      {}", stats.name);
            println!("Store:           {}", path.display());
            println!("Chunks:          {}", stats.chunks);
            println!("Sources:         {}", stats.sources);
            match stats.dimensions {
                Some(dims) => println!("Dimensions:      {}", dims),
                None => println!("Dimensions:      -"),
            }
            if stats.chunks == 0 {
                println!();
                println!("Store is empty; run `pdfqa ingest` to index your PDFs.");
            }
        }
    }
    Ok(())
}
