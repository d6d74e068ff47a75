//! Serve command

use super::build_pipeline;
use crate::app::ServeArgs;
use crate::server::{router, AppState};
use anyhow::{Context, Result};
use pdfqa_core::{Config, PdfLoader};
use tokio::net::TcpListener;

pub async fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config).await?;

    let report = pipeline
        .bootstrap(&PdfLoader::from_config(&config.documents))
        .await
        .context("Bootstrap failed")?;
    if report.skipped {
        tracing::info!("Using existing store | chunks={}", report.stored);
    } else {
        tracing::info!(
            "Bootstrap complete | documents={} | chunks={}",
            report.documents,
            report.chunks
        );
    }

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);
    eprintln!("Listening on http://{}", addr);

    let app = router(AppState::new(pipeline));
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
