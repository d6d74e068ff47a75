//! Config command

use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use anyhow::Result;
use pdfqa_core::{Config, PdfQaError};
use std::path::{Path, PathBuf};

pub fn run(args: ConfigArgs, config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = match config_path {
                Some(path) => Config::load_from(path)?,
                None => Config::load()?,
            };
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Cli => print!("{}", serde_yaml::to_string(&config)?),
            }
        }
        ConfigAction::Init { path, force } => {
            let path: PathBuf = path
                .or_else(|| config_path.map(Path::to_path_buf))
                .unwrap_or_else(Config::default_path);

            if path.exists() && !force {
                return Err(PdfQaError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ))
                .into());
            }

            Config::default().save_to(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
