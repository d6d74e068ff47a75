//! pdfqa CLI
//!
//! Ask questions about a folder of PDFs.

use anyhow::Result;
use clap::Parser;
use pdfqa_core::error::exit_codes;
use pdfqa_core::{Config, PdfQaError};
use std::path::{Path, PathBuf};

mod app;
mod commands;
mod logging;
mod output;
mod server;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<PdfQaError>()
            .map(PdfQaError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.as_deref();

    match cli.command {
        Commands::Config(args) => {
            logging::init(cli.verbose, None);
            commands::config::run(args, path, cli.format)
        }
        Commands::Ingest => {
            let config = setup(path, cli.verbose, None)?;
            commands::ingest::run(&config, cli.format).await
        }
        Commands::Ask(args) => {
            let config = setup(path, cli.verbose, None)?;
            commands::ask::run(args, &config, cli.format).await
        }
        Commands::Search(args) => {
            let config = setup(path, cli.verbose, None)?;
            commands::search::run(args, &config, cli.format).await
        }
        Commands::Status => {
            let config = setup(path, cli.verbose, None)?;
            commands::status::run(&config, cli.format).await
        }
        Commands::Serve(args) => {
            let default_log = PathBuf::from(logging::DEFAULT_SERVER_LOG);
            let config = setup(path, cli.verbose, Some(&default_log))?;
            commands::serve::run(args, &config).await
        }
    }
}

/// Load config (`--config`/`PDFQA_CONFIG`, else the user config path) and start logging
fn setup(path: Option<&Path>, verbose: bool, default_log: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let log_file = config.logging.file.as_deref().or(default_log);
    logging::init(verbose, log_file);
    tracing::debug!("Configuration loaded | collection={}", config.vector_store.collection);

    Ok(config)
}
